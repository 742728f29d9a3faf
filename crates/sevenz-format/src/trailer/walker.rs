//! The opcode-driven walk over the trailer bytes

use binrw::Endian;
use tracing::warn;

use super::encoder::EncoderDescriptor;
use super::grammar::{ExpectedSet, successors};
use super::opcode::Opcode;
use super::{TrailerKind, TrailerState};
use crate::cursor::ByteCursor;
use crate::error::{FormatError, FormatResult};

/// Walk the trailer bytes to completion.
///
/// Each iteration reads one opcode, checks it against the expectation left
/// by the previous step, then runs its handler. Reaching the end of the
/// trailer with a pending expectation is a sequence error.
pub(crate) fn walk(bytes: &[u8]) -> FormatResult<TrailerState> {
    let mut cursor = ByteCursor::new(bytes);
    let mut state = TrailerState::default();
    let mut expected = ExpectedSet::NONE;

    while !cursor.at_end() {
        let byte = cursor.read_u8()?;
        let opcode = check_sequence(byte, expected)?;
        expected = successors(opcode);
        step(&mut state, opcode, &mut cursor)?;
    }

    if !expected.is_empty() {
        return Err(FormatError::SequenceError {
            found: "end of trailer".into(),
            expected: expected.to_string(),
        });
    }
    Ok(state)
}

/// Enforce the legal-successor constraint for one opcode byte.
///
/// `End` closes the current nesting level and is legal under any
/// expectation.
fn check_sequence(byte: u8, expected: ExpectedSet) -> FormatResult<Opcode> {
    let opcode = Opcode::from_byte(byte);
    if opcode == Some(Opcode::End) {
        return Ok(Opcode::End);
    }
    if !expected.is_empty() {
        return match opcode {
            Some(opcode) if expected.contains(opcode) => Ok(opcode),
            _ => Err(FormatError::SequenceError {
                found: opcode.map_or_else(|| format!("0x{byte:02X}"), |o| o.name().to_owned()),
                expected: expected.to_string(),
            }),
        };
    }
    opcode.ok_or_else(|| FormatError::Unimplemented(format!("opcode 0x{byte:02X}")))
}

/// Run one opcode's handler against the in-progress state
fn step(state: &mut TrailerState, opcode: Opcode, cursor: &mut ByteCursor<'_>) -> FormatResult<()> {
    match opcode {
        Opcode::End | Opcode::MainStreamsInfo | Opcode::UnpackInfo => {}
        Opcode::Header => state.kind = Some(TrailerKind::Unpacked),
        Opcode::EncodedHeader => state.kind = Some(TrailerKind::Packed),
        Opcode::FilesInfo => state.file_count = Some(cursor.read_number()?),
        Opcode::PackInfo => {
            state.data_offset = cursor.read_number()?;
            state.stream_count = cursor.read_u8()?;
        }
        Opcode::Size => {
            for _ in 0..state.stream_count {
                state.pack_sizes.push(cursor.read_number()?);
            }
        }
        Opcode::Digest => read_digest(state, cursor)?,
        Opcode::Folder => {
            state.folder_count = cursor.read_u8()?;
            if cursor.read_bool()? {
                return Err(FormatError::Unimplemented("external folder data".into()));
            }
            let encoder_count = cursor.read_number()?;
            for _ in 0..encoder_count {
                state.encoders.push(EncoderDescriptor::parse(cursor)?);
            }
        }
        Opcode::EncoderUnpackSize => {
            state.encoder_unpack_size = Some(cursor.read_number()?);
            skip_to_digest(state, cursor)?;
            read_digest(state, cursor)?;
        }
        Opcode::FileName => read_file_names(state, cursor)?,
        Opcode::CTime | Opcode::ATime | Opcode::MTime | Opcode::Attributes => {
            read_external_blob(state, opcode, cursor)?;
        }
        Opcode::Dummy => {
            let count = cursor.read_number()? as usize;
            if cursor.read(count)?.iter().any(|&byte| byte != 0) {
                return Err(FormatError::FormatMismatch(
                    "nonzero byte in padding block".into(),
                ));
            }
        }
        other => return Err(FormatError::Unimplemented(format!("{other} block"))),
    }
    Ok(())
}

/// One checksum block: an all-defined flag followed by 4 checksum bytes
fn read_digest(state: &mut TrailerState, cursor: &mut ByteCursor<'_>) -> FormatResult<()> {
    if !cursor.read_bool()? {
        return Err(FormatError::Unimplemented(
            "partially defined digests".into(),
        ));
    }
    state.digests.push(cursor.read_int(4, Endian::Big)? as u32);
    Ok(())
}

/// Tolerate stray bytes between the post-folder size and its digest.
///
/// Some writers emit extra bytes here; their cause in the format is
/// unconfirmed. They are counted and flagged rather than silently
/// discarded. Running out of trailer before a digest appears is a sequence
/// error.
fn skip_to_digest(state: &mut TrailerState, cursor: &mut ByteCursor<'_>) -> FormatResult<()> {
    let mut skipped = 0usize;
    loop {
        match cursor.peek() {
            None => {
                return Err(FormatError::SequenceError {
                    found: "end of trailer".into(),
                    expected: Opcode::Digest.name().to_owned(),
                });
            }
            Some(byte) if byte == Opcode::Digest as u8 => {
                cursor.read_u8()?;
                break;
            }
            Some(_) => {
                cursor.read_u8()?;
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!(skipped, "skipped stray bytes before digest block");
        state.anomaly_skipped += skipped;
    }
    Ok(())
}

/// The file-name block: UTF-16 text, NUL-separated, one entry per file
fn read_file_names(state: &mut TrailerState, cursor: &mut ByteCursor<'_>) -> FormatResult<()> {
    let length = cursor.read_number()? as usize;
    if length == 0 {
        return Err(FormatError::FormatMismatch("empty file-name block".into()));
    }
    if cursor.read_bool()? {
        return Err(FormatError::Unimplemented(
            "externally stored file names".into(),
        ));
    }
    let raw = cursor.read(length - 1)?;
    if raw.len() % 2 != 0 {
        return Err(FormatError::FormatMismatch(
            "file-name block length is not a whole number of UTF-16 units".into(),
        ));
    }
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units)
        .map_err(|_| FormatError::FormatMismatch("invalid UTF-16 in file names".into()))?;
    state.file_names = text
        .split('\0')
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();
    Ok(())
}

/// Time and attribute blocks; only externally stored values are supported
fn read_external_blob(
    state: &mut TrailerState,
    opcode: Opcode,
    cursor: &mut ByteCursor<'_>,
) -> FormatResult<()> {
    let length = cursor.read_number()? as usize;
    if length == 0 {
        return Err(FormatError::FormatMismatch(format!("empty {opcode} block")));
    }
    if !cursor.read_bool()? {
        return Err(FormatError::Unimplemented(format!(
            "internally stored {opcode} values"
        )));
    }
    let blob = cursor.read(length - 1)?.to_vec();
    let slot = match opcode {
        Opcode::CTime => &mut state.ctime,
        Opcode::ATime => &mut state.atime,
        Opcode::MTime => &mut state.mtime,
        _ => &mut state.attributes,
    };
    *slot = Some(blob);
    Ok(())
}
