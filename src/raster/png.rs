//! Minimal PNG encoder (8-bit RGB, no interlace)

use std::io::Write;

use flate2::Crc;
use flate2::Compression;
use flate2::write::ZlibEncoder;

pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Color type 2: truecolor
const COLOR_TYPE_RGB: u8 = 2;
/// Scanline filter type 0: none
const FILTER_NONE: u8 = 0;

/// Encode tightly packed RGB rows into a PNG file
pub fn encode_rgb(width: u32, height: u32, rgb: &[u8]) -> std::io::Result<Vec<u8>> {
    let stride = width as usize * 3;
    debug_assert_eq!(rgb.len(), stride * height as usize);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, COLOR_TYPE_RGB, 0, 0, 0]);

    let mut zlib = ZlibEncoder::new(Vec::new(), Compression::default());
    for row in rgb.chunks(stride) {
        zlib.write_all(&[FILTER_NONE])?;
        zlib.write_all(row)?;
    }
    let idat = zlib.finish()?;

    let mut out = Vec::with_capacity(SIGNATURE.len() + idat.len() + 64);
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr);
    write_chunk(&mut out, b"IDAT", &idat);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut crc = Crc::new();
    crc.update(kind);
    crc.update(data);
    out.extend_from_slice(&crc.sum().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_iend_chunk_crc() {
        // IEND has a fixed, well-known CRC
        let png = encode_rgb(1, 1, &[0, 0, 0]).unwrap();
        let tail = &png[png.len() - 12..];
        assert_eq!(tail, &[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_header_fields() {
        let png = encode_rgb(3, 2, &[255; 18]).unwrap();
        assert_eq!(&png[..8], &SIGNATURE);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(u32::from_be_bytes(png[16..20].try_into().unwrap()), 3);
        assert_eq!(u32::from_be_bytes(png[20..24].try_into().unwrap()), 2);
        assert_eq!(png[24], 8);
        assert_eq!(png[25], COLOR_TYPE_RGB);
    }

    #[test]
    fn test_idat_inflates_to_filtered_rows() {
        let rgb = [1, 2, 3, 4, 5, 6];
        let png = encode_rgb(1, 2, &rgb).unwrap();

        // IHDR chunk spans bytes 8..33, IDAT follows
        let len = u32::from_be_bytes(png[33..37].try_into().unwrap()) as usize;
        assert_eq!(&png[37..41], b"IDAT");
        let mut raw = Vec::new();
        flate2::read::ZlibDecoder::new(&png[41..41 + len])
            .read_to_end(&mut raw)
            .unwrap();
        assert_eq!(raw, vec![0, 1, 2, 3, 0, 4, 5, 6]);
    }
}
