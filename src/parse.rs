use std::io;

/// Split a byte into the fields selected by each bitmask. Fields are not shifted.
#[macro_export]
#[doc(hidden)]
macro_rules! mask {
    ($byte:expr, $($m:expr),+) => {{
        let byte: u8 = $byte;
        ($(byte & $m),+)
    }};
}

pub trait ReadExt: io::Read {
    fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_be(&mut self) -> io::Result<u16> {
        let mut buf = [0; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_u64_be(&mut self) -> io::Result<u64> {
        let mut buf = [0; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }
}

impl<R: io::Read + ?Sized> ReadExt for R {}

/// A read that gave up because the socket read timeout elapsed.
/// Unix reports `WouldBlock`, Windows reports `TimedOut`.
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
