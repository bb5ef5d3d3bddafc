use std::{
    io::{Read, Write},
    str::FromStr,
};

use super::error::{AdbError, AdbResult};

// Streaming

pub fn read_exact<T: Read>(source: &mut T, len: usize) -> AdbResult<Vec<u8>> {
    let mut buf = vec![0; len];
    source.read_exact(&mut buf).map_err(AdbError::from)?;
    Ok(buf)
}

pub fn read_exact_to_string<T: Read>(source: &mut T, len: usize) -> AdbResult<String> {
    let bytes = read_exact(source, len)?;
    let s = std::str::from_utf8(&bytes).map_err(AdbError::from)?;
    Ok(s.to_string())
}

// Following are more utilized things

pub fn read_payload_len<T: Read>(source: &mut T) -> AdbResult<usize> {
    let len = read_exact_to_string(source, 4)?;
    let len = usize::from_str_radix(&len, 16).map_err(AdbError::from)?;
    Ok(len)
}

pub fn read_payload<T: Read>(source: &mut T) -> AdbResult<Vec<u8>> {
    let len = read_payload_len(source)?;
    let bytes = read_exact(source, len)?;
    Ok(bytes)
}

pub fn read_payload_to_string<T: Read>(source: &mut T) -> AdbResult<String> {
    let bytes = read_payload(source)?;
    let s = std::str::from_utf8(&bytes).map_err(AdbError::from)?;
    Ok(s.to_string())
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResponseStatus {
    Okay,
    Fail,
}

impl FromStr for ResponseStatus {
    type Err = AdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OKAY" => Ok(Self::Okay),
            "FAIL" => Ok(Self::Fail),
            _ => Err(AdbError::UnknownResponseStatus(s.to_string())),
        }
    }
}

pub fn read_response_status<T: Read>(source: &mut T) -> AdbResult<ResponseStatus> {
    let status = read_exact_to_string(source, 4)?;
    let status = ResponseStatus::from_str(&status)?;
    Ok(status)
}

/// Write `request` prefixed with its length as four hex digits
pub fn write_request<T: Write>(target: &mut T, request: &str) -> AdbResult<()> {
    if request.len() > 0xffff {
        return Err(AdbError::ProtocolError(format!(
            "request of {} bytes is too long",
            request.len()
        )));
    }
    target
        .write_all(format!("{:04x}{}", request.len(), request).as_bytes())
        .map_err(AdbError::from)
}
