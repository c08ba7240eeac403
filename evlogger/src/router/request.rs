//! Request line parsing.

use crate::domain::{ChannelId, ChannelName, DateTime, ProtocolError};
use crate::text::TextBuf;

/// Longest decoded query argument accepted.
const MAX_ARGUMENT: usize = 64;

/// A parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `GET /` or `GET /log`: the most recent records.
    Recent,
    /// `GET /dump`: every live record.
    Dump,
    /// `GET /addr`: current header slot and log bounds.
    Addr,
    /// `GET /clr`: truncate the log.
    Clear,
    /// `GET /time`: read the clock.
    Time,
    /// `GET /time?...`: set the clock.
    SetTime(DateTime),
    /// `GET /cnl`: list channel names.
    Names,
    /// `GET /cnl?b{B}c{P}{name}`: rename one channel.
    SetName(ChannelId, ChannelName),
    /// `GET /cnl?reset`: restore all placeholders.
    ResetNames,
    /// `GET /bank`: raw bank bitsets.
    Banks,
}

impl Request {
    /// Parse the first line of an HTTP request.
    ///
    /// Anything after the first line (headers, body) is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use evlogger::Request;
    ///
    /// assert_eq!(Request::parse(b"GET /log HTTP/1.1\r\n\r\n"), Ok(Request::Recent));
    /// assert!(Request::parse(b"POST /log HTTP/1.1\r\n").is_err());
    /// ```
    pub fn parse(request: &[u8]) -> Result<Self, ProtocolError> {
        let line_end = request
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .unwrap_or(request.len());
        let line = &request[..line_end];

        let target = line
            .strip_prefix(b"GET ")
            .ok_or(ProtocolError::MalformedRequest)?;
        let target_end = target
            .iter()
            .position(|&b| b == b' ')
            .unwrap_or(target.len());
        let target = &target[..target_end];
        if !target.starts_with(b"/") {
            return Err(ProtocolError::MalformedRequest);
        }

        let (path, query) = match target.iter().position(|&b| b == b'?') {
            Some(at) => (&target[..at], Some(&target[at + 1..])),
            None => (target, None),
        };

        match (path, query) {
            (b"/" | b"/log", _) => Ok(Self::Recent),
            (b"/dump", _) => Ok(Self::Dump),
            (b"/addr", _) => Ok(Self::Addr),
            (b"/clr", _) => Ok(Self::Clear),
            (b"/bank", _) => Ok(Self::Banks),
            (b"/time", None) => Ok(Self::Time),
            (b"/time", Some(query)) => parse_time(query).map(Self::SetTime),
            (b"/cnl", None) => Ok(Self::Names),
            (b"/cnl", Some(b"reset")) => Ok(Self::ResetNames),
            (b"/cnl", Some(query)) => parse_name(query),
            _ => Err(ProtocolError::UnknownPath),
        }
    }

    /// Whether serving this request changes stored state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Clear | Self::SetTime(_) | Self::SetName(..) | Self::ResetNames
        )
    }
}

fn parse_time(query: &[u8]) -> Result<DateTime, ProtocolError> {
    let decoded = percent_decode(query).map_err(|_| ProtocolError::BadTime)?;
    let text = decoded.as_bytes();
    match text.len() {
        DateTime::COMPACT_LEN => DateTime::parse_compact(text),
        DateTime::TEXT_LEN => DateTime::parse(text),
        _ => None,
    }
    .ok_or(ProtocolError::BadTime)
}

fn parse_name(query: &[u8]) -> Result<Request, ProtocolError> {
    // b{B}c{P}{name}
    let [b'b', bank, b'c', pin, name @ ..] = query else {
        return Err(ProtocolError::BadChannel);
    };
    let channel = hex_digit(*bank)
        .zip(hex_digit(*pin))
        .and_then(|(bank, pin)| ChannelId::new(bank, pin))
        .ok_or(ProtocolError::BadChannel)?;

    let decoded = percent_decode(name).map_err(|_| ProtocolError::BadName)?;
    let name = ChannelName::from_text(decoded.as_bytes()).ok_or(ProtocolError::BadName)?;
    Ok(Request::SetName(channel, name))
}

/// Decode `%XX` escapes and `+` as space.
fn percent_decode(text: &[u8]) -> Result<TextBuf<MAX_ARGUMENT>, ProtocolError> {
    let mut out = TextBuf::new();
    let mut rest = text;
    while let Some((&b, tail)) = rest.split_first() {
        let (byte, tail) = match b {
            b'%' => match tail {
                [hi, lo, tail @ ..] => {
                    let hi = hex_digit(*hi).ok_or(ProtocolError::MalformedRequest)?;
                    let lo = hex_digit(*lo).ok_or(ProtocolError::MalformedRequest)?;
                    ((hi << 4) | lo, tail)
                }
                _ => return Err(ProtocolError::MalformedRequest),
            },
            b'+' => (b' ', tail),
            _ => (b, tail),
        };
        out.push(byte)
            .map_err(|_| ProtocolError::MalformedRequest)?;
        rest = tail;
    }
    Ok(out)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Request, ProtocolError> {
        Request::parse(line.as_bytes())
    }

    #[test]
    fn test_simple_routes() {
        assert_eq!(
            parse("GET / HTTP/1.1\r\nHost: x\r\n\r\n"),
            Ok(Request::Recent)
        );
        assert_eq!(parse("GET /log HTTP/1.0"), Ok(Request::Recent));
        assert_eq!(parse("GET /dump HTTP/1.1"), Ok(Request::Dump));
        assert_eq!(parse("GET /addr HTTP/1.1"), Ok(Request::Addr));
        assert_eq!(parse("GET /clr HTTP/1.1"), Ok(Request::Clear));
        assert_eq!(parse("GET /time HTTP/1.1"), Ok(Request::Time));
        assert_eq!(parse("GET /cnl HTTP/1.1"), Ok(Request::Names));
        assert_eq!(parse("GET /cnl?reset HTTP/1.1"), Ok(Request::ResetNames));
        assert_eq!(parse("GET /bank"), Ok(Request::Banks));
    }

    #[test]
    fn test_unknown_and_malformed() {
        assert_eq!(
            parse("GET /favicon.ico HTTP/1.1"),
            Err(ProtocolError::UnknownPath)
        );
        assert_eq!(
            parse("PUT /log HTTP/1.1"),
            Err(ProtocolError::MalformedRequest)
        );
        assert_eq!(
            parse("GET log HTTP/1.1"),
            Err(ProtocolError::MalformedRequest)
        );
        assert_eq!(parse(""), Err(ProtocolError::MalformedRequest));
    }

    #[test]
    fn test_set_time_forms() {
        let expected = DateTime::new(2024, 6, 30, 18, 5, 0).unwrap();
        assert_eq!(
            parse("GET /time?20240630180500 HTTP/1.1"),
            Ok(Request::SetTime(expected))
        );
        assert_eq!(
            parse("GET /time?2024-06-30%2018:05:00 HTTP/1.1"),
            Ok(Request::SetTime(expected))
        );
        assert_eq!(
            parse("GET /time?2024063018050 HTTP/1.1"),
            Err(ProtocolError::BadTime)
        );
        assert_eq!(
            parse("GET /time?20241330180500 HTTP/1.1"),
            Err(ProtocolError::BadTime)
        );
    }

    #[test]
    fn test_set_name() {
        let request = parse("GET /cnl?b1cfmain%20door HTTP/1.1").unwrap();
        let Request::SetName(channel, name) = request else {
            panic!("expected SetName, got {:?}", request);
        };
        assert_eq!(channel, ChannelId::new(1, 15).unwrap());
        assert_eq!(name.trimmed(), b"main door");
        assert!(request.is_mutation());
    }

    #[test]
    fn test_set_name_rejections() {
        assert_eq!(
            parse("GET /cnl?b2c0x HTTP/1.1"),
            Err(ProtocolError::BadChannel)
        );
        assert_eq!(
            parse("GET /cnl?b0cgx HTTP/1.1"),
            Err(ProtocolError::BadChannel)
        );
        assert_eq!(parse("GET /cnl?x HTTP/1.1"), Err(ProtocolError::BadChannel));
        assert_eq!(parse("GET /cnl?b0c0 HTTP/1.1"), Err(ProtocolError::BadName));
        assert_eq!(
            parse("GET /cnl?b0c0%zz HTTP/1.1"),
            Err(ProtocolError::BadName)
        );
        let long = format!("GET /cnl?b0c0{} HTTP/1.1", "x".repeat(41));
        assert_eq!(parse(&long), Err(ProtocolError::BadName));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode(b"a%41+b").unwrap().as_bytes(), b"aA b");
        assert!(percent_decode(b"%4").is_err());
    }
}
