//! Body acquisition.
//!
//! Drains a byte stream into memory before it is handed to the decoder. The
//! bytes are never modified after acquisition.

use bytes::Bytes;
use http_body::Body;
use http_body_util::BodyExt;
use std::io::Read;
use thiserror::Error;

/// Boxed error produced by an HTTP body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An HTTP body stream failed before it was fully read.
#[derive(Debug, Error)]
#[error("failed to read request body: {0}")]
pub struct BodyReadError(#[source] BoxError);

/// Reads `reader` to its end.
///
/// The reader is consumed and dropped (closed) once drained, whether or not
/// the read succeeded.
///
/// # Errors
///
/// Returns the first I/O error the reader reports. No retry is attempted.
pub fn read_body<R: Read>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Collects every data frame of an HTTP body. Trailers are discarded.
///
/// # Errors
///
/// Returns a [`BodyReadError`] wrapping the stream's error.
pub async fn collect_body<B>(body: B) -> Result<Bytes, BodyReadError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let collected = body.collect().await.map_err(|e| BodyReadError(e.into()))?;
    Ok(collected.to_bytes())
}
