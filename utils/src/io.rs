use std::io::{ErrorKind, Read};

/// Read until `buf` is full or the reader hits EOF, returns the number of bytes read.
///
/// Unlike a single `Read::read`, a short count here always means end of stream.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::read_full;
    use std::io::Read;

    // hands out at most 3 bytes per read
    struct Trickle<'a>(&'a [u8]);

    impl<'a> Read for Trickle<'a> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(3).min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn fills_across_short_reads() {
        let data = (0u8..20).collect::<Vec<_>>();
        let mut r = Trickle(&data);
        let mut buf = [0u8; 16];
        assert_eq!(read_full(&mut r, &mut buf).unwrap(), 16);
        assert_eq!(&buf[..], &data[..16]);
        assert_eq!(read_full(&mut r, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &data[16..]);
        assert_eq!(read_full(&mut r, &mut buf).unwrap(), 0);
    }
}
