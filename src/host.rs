//! Capabilities supplied by the host platform: where model bytes come from and go to, and
//! where randomness for weight initialization comes from.

use std::io::{self, Read, Write};

use rand::Rng;

/// Something model bytes can be read from.
pub trait ByteSource {
    /// Whether the source can be read at all. Loading from a source that is not ready fails
    /// with [`DiwaError::StreamNotOpen`](crate::DiwaError::StreamNotOpen).
    fn is_ready(&self) -> bool {
        true
    }

    /// Fills `buf` completely or fails.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()>;
}

/// Something model bytes can be written to.
pub trait ByteSink {
    fn is_ready(&self) -> bool {
        true
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ByteSource for &[u8] {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.read_exact(buf)
    }
}

impl ByteSink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_bytes(buf)
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_bytes(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// A stream over any [`Read`]/[`Write`] that may or may not be open.
#[derive(Debug)]
pub struct IoStream<T> {
    inner: Option<T>,
}

impl<T> Default for IoStream<T> {
    fn default() -> Self {
        Self::closed()
    }
}

impl<T> IoStream<T> {
    pub fn open(inner: T) -> Self {
        Self { inner: Some(inner) }
    }

    pub fn closed() -> Self {
        Self { inner: None }
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    pub fn get_ref(&self) -> Option<&T> {
        self.inner.as_ref()
    }

    /// Closes the stream, handing back what it wrapped.
    pub fn close(&mut self) -> Option<T> {
        self.inner.take()
    }

    pub fn into_inner(self) -> Option<T> {
        self.inner
    }

    fn inner_mut(&mut self) -> io::Result<&mut T> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))
    }
}

impl<R: Read> ByteSource for IoStream<R> {
    fn is_ready(&self) -> bool {
        self.is_open()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner_mut()?.read_exact(buf)
    }
}

impl<W: Write> ByteSink for IoStream<W> {
    fn is_ready(&self) -> bool {
        self.is_open()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner_mut()?.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner_mut()?.flush()
    }
}

/// Uniform random values in `[0, 1)`, used to initialize weights.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn closed_stream_is_not_ready() {
        let mut stream = IoStream::<Cursor<Vec<u8>>>::closed();
        assert!(!ByteSource::is_ready(&stream));
        assert!(!ByteSink::is_ready(&stream));
        let err = stream.write_bytes(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn open_stream_round_trips_bytes() {
        let mut stream = IoStream::open(Cursor::new(Vec::new()));
        stream.write_bytes(b"diwa").unwrap();
        ByteSink::flush(&mut stream).unwrap();
        let bytes = stream.close().unwrap().into_inner();
        assert!(!stream.is_open());

        let mut stream = IoStream::open(Cursor::new(bytes));
        let mut buf = [0u8; 4];
        stream.read_bytes(&mut buf).unwrap();
        assert_eq!(&buf, b"diwa");
        let err = stream.read_bytes(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn slices_and_vecs_are_capabilities() {
        let mut sink = Vec::new();
        sink.write_bytes(&[1, 2, 3]).unwrap();
        let mut source: &[u8] = &sink;
        let mut buf = [0u8; 2];
        source.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(source, &[3]);
    }

    #[test]
    fn rngs_yield_unit_interval() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let x = rng.next_unit();
            assert!((0.0..1.0).contains(&x));
        }
    }
}
