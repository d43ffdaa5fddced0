use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Returns the lowercase hex MD5 digest of the bytes.
///
/// # Examples
/// ```
/// use nucpix::checksum::md5_hex_bytes;
///
/// assert_eq!(md5_hex_bytes(b""), "d41d8cd98f00b204e9800998ecf8427e");
/// ```
#[must_use]
pub fn md5_hex_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}

/// Returns the lowercase hex MD5 digest of everything the reader yields.
pub fn md5_hex_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Md5::new();
    let mut buf = vec![0; READ_BUFFER_SIZE];

    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Returns the lowercase hex MD5 digest of the file contents.
pub fn md5_hex_file<P: AsRef<Path>>(path: P) -> io::Result<String> {
    md5_hex_reader(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use crate::checksum::{md5_hex_bytes, md5_hex_file, md5_hex_reader};

    #[test]
    fn test_md5_known_value() {
        assert_eq!(
            md5_hex_bytes(b"The quick brown fox jumps over the lazy dog"),
            "9e107d9d372bb6826bd81d3542a419d6"
        );
    }

    #[test]
    fn test_md5_reader_matches_bytes() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

        assert_eq!(md5_hex_reader(&data[..]).unwrap(), md5_hex_bytes(&data));
    }

    #[test]
    fn test_md5_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.fasta");
        fs::write(&path, ">seq1\nACGTN\n").unwrap();

        assert_eq!(
            md5_hex_file(&path).unwrap(),
            md5_hex_bytes(b">seq1\nACGTN\n")
        );
        assert!(md5_hex_file(dir.path().join("missing.fasta")).is_err());
    }
}
