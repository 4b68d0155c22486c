//! Bounded streaming reads: `cat` and `hexdump`.
//!
//! Both commands hold exactly one descriptor, read in chunks, stop at a
//! byte cap, and release the descriptor on every exit path (the
//! [`File`] handle closes on drop).

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use storage::{File, OpenFlags, Vfs, VfsError};

use crate::config::{ShellConfig, DUMP_ROW_LEN};
use crate::console::Console;
use crate::error::ShellError;
use crate::path::PathResolver;

/// What a streaming command emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// File bytes written to the console, notices excluded.
    pub bytes: usize,
    /// The byte cap cut the stream short.
    pub truncated: bool,
}

/// `cat <path>`: copy a file to the console.
///
/// A missing file prints nothing but the error. Once the cap is reached
/// and more data remains, a single truncation notice is printed and
/// reading stops. A trailing newline follows the content on every path
/// that produced a stream, including a read error after partial output.
pub fn cat<V, C>(
    vfs: &V,
    resolver: &PathResolver,
    config: &ShellConfig,
    arg: &str,
    out: &mut C,
) -> Result<StreamSummary, ShellError>
where
    V: Vfs + ?Sized,
    C: Console + ?Sized,
{
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(ShellError::Usage("cat <path>"));
    }

    let path = resolver.resolve(arg);
    let mut file =
        File::open(vfs, &path, OpenFlags::READ).map_err(|e| ShellError::from_vfs(arg, e))?;

    let limit = config.cat_byte_limit;
    let mut buf = vec![0u8; config.cat_chunk_size.max(1)];
    let mut total = 0usize;
    let mut truncated = false;

    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if total == 0 => return Err(ShellError::from_vfs(arg, e)),
            Err(e) => {
                log::warn!("[SHELL] cat {}: read failed after {} bytes: {}", path, total, e);
                break;
            }
        };

        let room = limit - total;
        let take = n.min(room);
        out.write_bytes(&buf[..take]);
        total += take;

        if n > room {
            truncated = true;
            break;
        }
    }

    if truncated {
        log::debug!("[SHELL] cat {}: truncated at {} bytes", path, limit);
        out.write_str(&format!("\n[output truncated at {} bytes]", limit));
    }
    out.write_bytes(b"\n");

    if let Err(e) = file.close() {
        log::warn!("[SHELL] cat {}: close failed: {}", path, e);
    }
    Ok(StreamSummary {
        bytes: total,
        truncated,
    })
}

/// `hexdump <path>`: dump at most `dump_byte_limit` bytes of a file.
pub fn hexdump<V, C>(
    vfs: &V,
    resolver: &PathResolver,
    config: &ShellConfig,
    arg: &str,
    out: &mut C,
) -> Result<StreamSummary, ShellError>
where
    V: Vfs + ?Sized,
    C: Console + ?Sized,
{
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(ShellError::Usage("hexdump <path>"));
    }

    let path = resolver.resolve(arg);
    let mut file =
        File::open(vfs, &path, OpenFlags::READ).map_err(|e| ShellError::from_vfs(arg, e))?;

    let limit = config.dump_byte_limit;
    let (data, truncated) = match read_capped(&mut file, limit) {
        Ok(read) => read,
        Err(e) => return Err(ShellError::from_vfs(arg, e)),
    };
    drop(file);

    for (row, chunk) in data.chunks(DUMP_ROW_LEN).enumerate() {
        out.write_line(&hex_row(row * DUMP_ROW_LEN, chunk));
    }
    out.write_line(&format!("{:08x}", data.len()));
    if truncated {
        out.write_line(&format!("[dump limited to {} bytes]", limit));
    }

    Ok(StreamSummary {
        bytes: data.len(),
        truncated,
    })
}

/// Read up to `limit` bytes; report whether more data followed.
///
/// A read error with nothing read yet is returned; after partial data it
/// just ends the read.
fn read_capped<V: Vfs + ?Sized>(
    file: &mut File<'_, V>,
    limit: usize,
) -> Result<(Vec<u8>, bool), VfsError> {
    let mut data = Vec::with_capacity(limit);
    let mut buf = [0u8; DUMP_ROW_LEN * 4];

    while data.len() < limit {
        let want = buf.len().min(limit - data.len());
        match file.read(&mut buf[..want]) {
            Ok(0) => return Ok((data, false)),
            Ok(n) => data.extend_from_slice(&buf[..n]),
            Err(e) if data.is_empty() => return Err(e),
            Err(_) => return Ok((data, false)),
        }
    }

    let mut next_byte = [0u8; 1];
    let more = matches!(file.read(&mut next_byte), Ok(n) if n > 0);
    Ok((data, more))
}

/// One `hexdump` row: offset, hex column padded to 48, ASCII gutter.
pub fn hex_row(offset: usize, chunk: &[u8]) -> String {
    let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
    let ascii: String = chunk
        .iter()
        .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { '.' })
        .collect();
    format!("{:08x}  {:<47}  |{}|", offset, hex.join(" "), ascii)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::BufferConsole;
    use storage::MemFs;

    fn setup() -> (MemFs, PathResolver, ShellConfig) {
        let fs = MemFs::new();
        fs.add_dir("/home").unwrap();
        (fs, PathResolver::new("/home", 255), ShellConfig::default())
    }

    #[test]
    fn cat_small_file() {
        let (fs, r, c) = setup();
        fs.add_file("/home/hello.txt", b"hello").unwrap();
        let mut out = BufferConsole::new();
        let summary = cat(&fs, &r, &c, "hello.txt", &mut out).unwrap();
        assert_eq!(out.as_bytes(), b"hello\n");
        assert_eq!(summary, StreamSummary { bytes: 5, truncated: false });
        assert_eq!(fs.open_fds(), 0);
    }

    #[test]
    fn cat_missing_file_prints_nothing() {
        let (fs, r, c) = setup();
        let mut out = BufferConsole::new();
        let err = cat(&fs, &r, &c, "ghost", &mut out).unwrap_err();
        assert_eq!(err, ShellError::NotFound { path: "ghost".into() });
        assert!(out.as_bytes().is_empty());
        assert_eq!(fs.open_fds(), 0);
    }

    #[test]
    fn cat_usage() {
        let (fs, r, c) = setup();
        let mut out = BufferConsole::new();
        assert_eq!(
            cat(&fs, &r, &c, "   ", &mut out),
            Err(ShellError::Usage("cat <path>"))
        );
    }

    #[test]
    fn cat_loops_over_short_reads() {
        let (fs, r, c) = setup();
        let data: Vec<u8> = (0..1000u32).map(|i| b'a' + (i % 26) as u8).collect();
        fs.add_file("/home/big", &data).unwrap();
        fs.set_read_limit(Some(7));
        let mut out = BufferConsole::new();
        cat(&fs, &r, &c, "big", &mut out).unwrap();
        assert_eq!(&out.as_bytes()[..1000], &data[..]);
        assert_eq!(out.as_bytes().len(), 1001);
    }

    #[test]
    fn cat_truncates_once_and_closes() {
        let (fs, r, c) = setup();
        fs.add_file("/home/huge", &vec![b'z'; 70_000]).unwrap();
        let mut out = BufferConsole::new();
        let summary = cat(&fs, &r, &c, "huge", &mut out).unwrap();
        assert!(summary.truncated);
        assert_eq!(summary.bytes, 65_536);
        let text = out.text();
        assert_eq!(text.matches("[output truncated").count(), 1);
        assert!(text.ends_with("]\n"));
        assert_eq!(fs.open_fds(), 0);
    }

    #[test]
    fn cat_exactly_at_limit_is_not_truncated() {
        let (fs, r, c) = setup();
        fs.add_file("/home/edge", &vec![b'e'; 65_536]).unwrap();
        let mut out = BufferConsole::new();
        let summary = cat(&fs, &r, &c, "edge", &mut out).unwrap();
        assert!(!summary.truncated);
        assert_eq!(out.as_bytes().len(), 65_537);
    }

    #[test]
    fn cat_read_error_after_output_ends_with_newline() {
        let (fs, r, c) = setup();
        fs.add_file("/home/f", &vec![b'q'; 600]).unwrap();
        fs.fail_reads_after(Some(1));
        let mut out = BufferConsole::new();
        let summary = cat(&fs, &r, &c, "f", &mut out).unwrap();
        assert_eq!(summary.bytes, 255);
        assert_eq!(out.as_bytes().len(), 256);
        assert_eq!(out.as_bytes().last(), Some(&b'\n'));
        assert_eq!(fs.open_fds(), 0);
    }

    #[test]
    fn cat_directory_is_an_error_without_output() {
        let (fs, r, c) = setup();
        let mut out = BufferConsole::new();
        let err = cat(&fs, &r, &c, "/home", &mut out).unwrap_err();
        assert_eq!(
            err,
            ShellError::Vfs { path: "/home".into(), error: VfsError::IsADirectory }
        );
        assert!(out.as_bytes().is_empty());
        assert_eq!(fs.open_fds(), 0);
    }

    #[test]
    fn hexdump_rows() {
        let (fs, r, c) = setup();
        fs.add_file("/home/bin", b"ABCDEFGHIJKLMNOP\x00\x01").unwrap();
        let mut out = BufferConsole::new();
        hexdump(&fs, &r, &c, "bin", &mut out).unwrap();
        let lines = out.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "00000000  41 42 43 44 45 46 47 48 49 4a 4b 4c 4d 4e 4f 50  |ABCDEFGHIJKLMNOP|"
        );
        assert_eq!(lines[1], format!("00000010  {:<47}  |..|", "00 01"));
        assert_eq!(lines[0].find('|'), lines[1].find('|'));
        assert_eq!(lines[2], "00000012");
    }

    #[test]
    fn hexdump_is_capped() {
        let (fs, r, c) = setup();
        fs.add_file("/home/mem", &vec![0xaa; 2048]).unwrap();
        let mut out = BufferConsole::new();
        let summary = hexdump(&fs, &r, &c, "mem", &mut out).unwrap();
        assert_eq!(summary, StreamSummary { bytes: 512, truncated: true });
        let lines = out.lines();
        assert_eq!(lines.len(), 512 / 16 + 2);
        assert_eq!(lines[lines.len() - 1], "[dump limited to 512 bytes]");
        assert_eq!(fs.open_fds(), 0);
    }
}
