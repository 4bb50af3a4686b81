//! Minimal EXIF reader for the `Orientation` tag (0x0112).
//!
//! For JPEG: reads the APP1 segment carrying the `Exif\0\0` header and walks
//! IFD0 of the embedded TIFF structure.
//! For TIFF: walks IFD0 of the file itself.
//!
//! Any parse failure yields `None`; callers treat that as "upright".

use std::path::Path;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const ORIENTATION_TAG: u16 = 0x0112;
const TYPE_SHORT: u16 = 3;

/// Read the EXIF orientation value (1–8) from a file.
/// Returns `None` if the file can't be read or carries no orientation.
pub fn read_orientation(path: &Path) -> Option<u16> {
    let bytes = std::fs::read(path).ok()?;
    read_orientation_from_bytes(&bytes)
}

/// Read the EXIF orientation from an in-memory encoded image,
/// dispatching on the leading magic bytes.
pub fn read_orientation_from_bytes(data: &[u8]) -> Option<u16> {
    if data.starts_with(&[0xFF, 0xD8]) {
        let tiff = find_jpeg_app1_exif(data)?;
        orientation_from_tiff(tiff)
    } else if data.starts_with(b"II") || data.starts_with(b"MM") {
        orientation_from_tiff(data)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// JPEG: locate the TIFF block inside APP1
// ---------------------------------------------------------------------------

/// Find the TIFF bytes inside a JPEG's `Exif` APP1 segment.
fn find_jpeg_app1_exif(data: &[u8]) -> Option<&[u8]> {
    // Skip SOI
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];

        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // Image data starts; metadata segments are all before SOS
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // Markers without a length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            break;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());

        if marker == 0xE1 && seg_start <= seg_end {
            let segment = &data[seg_start..seg_end];
            if let Some(tiff) = segment.strip_prefix(EXIF_HEADER) {
                return Some(tiff);
            }
        }

        pos += 2 + seg_len;
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF: walk IFD0 for the orientation entry
// ---------------------------------------------------------------------------

/// Extract the orientation SHORT from IFD0 of a TIFF structure.
fn orientation_from_tiff(data: &[u8]) -> Option<u16> {
    if data.len() < 8 {
        return None;
    }

    let big_endian = match &data[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => return None,
    };

    let read_u16 = |offset: usize| -> Option<u16> {
        let bytes = data.get(offset..offset + 2)?;
        Some(if big_endian {
            u16::from_be_bytes([bytes[0], bytes[1]])
        } else {
            u16::from_le_bytes([bytes[0], bytes[1]])
        })
    };

    let read_u32 = |offset: usize| -> Option<u32> {
        let bytes = data.get(offset..offset + 4)?;
        let arr = [bytes[0], bytes[1], bytes[2], bytes[3]];
        Some(if big_endian {
            u32::from_be_bytes(arr)
        } else {
            u32::from_le_bytes(arr)
        })
    };

    // TIFF magic (42)
    if read_u16(2)? != 42 {
        return None;
    }

    let ifd_offset = read_u32(4)? as usize;
    let entry_count = read_u16(ifd_offset)? as usize;
    let entries_start = ifd_offset + 2;

    for i in 0..entry_count {
        let entry_offset = entries_start + i * 12;
        let tag = read_u16(entry_offset)?;
        if tag != ORIENTATION_TAG {
            continue;
        }
        let typ = read_u16(entry_offset + 2)?;
        let count = read_u32(entry_offset + 4)?;
        if typ != TYPE_SHORT || count == 0 {
            return None;
        }
        // A single SHORT is stored inline, left-justified in the value field.
        let value = read_u16(entry_offset + 8)?;
        return (1..=8).contains(&value).then_some(value);
    }

    None
}
