//! Line-oriented capture of the supervised process's output streams.

use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio_stream::StreamExt;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Decoder, FramedRead};
use tracing::debug;

use crate::classify::classify;
use crate::events::{EventSink, LineEvent, RawLine, StreamChannel};

/// Frames a raw output stream into complete lines.
///
/// Lines are split on `\n` with a trailing `\r` trimmed; the bytes are
/// passed through undecoded so the classifier owns the UTF-8 handling. On
/// end of stream a non-empty unterminated tail is emitted as one final
/// line, matching how the backend's last words arrive when it dies
/// mid-line.
pub struct LineCodec;

impl Decoder for LineCodec {
    type Item = Vec<u8>;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(pos) = src.iter().position(|b| *b == b'\n') else {
            return Ok(None);
        };

        let mut line = src.split_to(pos + 1);
        line.truncate(pos);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }

        Ok(Some(line.to_vec()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let mut tail = src.split();
        if tail.last() == Some(&b'\r') {
            let trimmed = tail.len() - 1;
            tail.truncate(trimmed);
        }

        Ok(Some(tail.to_vec()))
    }
}

/// Read `io` to end of stream, classifying every completed line and
/// delivering the result to `sink` with a per-channel sequence number
/// starting at 0.
///
/// A mid-stream read failure is treated as end of stream for this channel
/// only; it is logged, never propagated.
pub async fn capture_lines<R>(io: R, channel: StreamChannel, sink: Arc<dyn EventSink>)
where
    R: AsyncRead + Unpin,
{
    let mut frames = FramedRead::with_capacity(io, LineCodec, 1024);
    let mut sequence: u64 = 0;

    while let Some(frame) = frames.next().await {
        match frame {
            Ok(bytes) => {
                let line = RawLine {
                    channel,
                    bytes,
                    sequence,
                };
                let rendered = classify(&line);
                sink.deliver(LineEvent {
                    channel: line.channel,
                    sequence: line.sequence,
                    rendered,
                });
                sequence += 1;
            }
            Err(e) => {
                debug!("capture read failed on {channel:?}, treating as end of stream: {e}");
                break;
            }
        }
    }
}
