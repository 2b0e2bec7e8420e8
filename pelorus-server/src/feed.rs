//! Byte-stream feeds for the receiver.
//!
//! The core never owns a transport; this module supplies one. Three feeds
//! are supported: stdin (the usual bridge from a serial port via `socat` or
//! similar), a TCP AIS distributor, and a timed replay of a recorded NMEA
//! log for testing without hardware.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines, Stdin};
use tokio::net::TcpStream;

use crate::Cli;

const CHUNK_SIZE: usize = 1024;

pub enum FeedSource {
    Stdin(Stdin),
    Tcp(TcpStream),
    Replay {
        lines: Lines<BufReader<File>>,
        pacing: Option<Duration>,
    },
}

impl FeedSource {
    /// Open the feed selected on the command line. `--replay` wins over
    /// `--tcp`; the default is stdin.
    pub async fn open(args: &Cli) -> anyhow::Result<Self> {
        if let Some(path) = &args.replay {
            return Self::replay(path, args.replay_rate).await;
        }
        if let Some(addr) = &args.tcp {
            let stream = TcpStream::connect(addr)
                .await
                .with_context(|| format!("connecting to AIS feed {}", addr))?;
            log::info!("connected to AIS feed {}", addr);
            return Ok(FeedSource::Tcp(stream));
        }
        log::info!("reading AIS sentences from stdin");
        Ok(FeedSource::Stdin(tokio::io::stdin()))
    }

    async fn replay(path: &Path, rate: u32) -> anyhow::Result<Self> {
        let file = File::open(path)
            .await
            .with_context(|| format!("opening replay file {}", path.display()))?;
        let pacing = (rate > 0).then(|| Duration::from_millis(1000 / rate as u64));
        match pacing {
            Some(_) => log::info!("replaying {} at {} sentences/s", path.display(), rate),
            None => log::info!("replaying {} unpaced", path.display()),
        }
        Ok(FeedSource::Replay {
            lines: BufReader::new(file).lines(),
            pacing,
        })
    }

    /// Read the next chunk of bytes. `None` means the feed is exhausted.
    pub async fn next_chunk(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        match self {
            FeedSource::Stdin(stdin) => read_chunk(stdin).await,
            FeedSource::Tcp(stream) => read_chunk(stream).await,
            FeedSource::Replay { lines, pacing } => {
                if let Some(delay) = pacing {
                    tokio::time::sleep(*delay).await;
                }
                match lines.next_line().await? {
                    Some(mut line) => {
                        // The receiver resynchronizes on line terminators
                        line.push_str("\r\n");
                        Ok(Some(line.into_bytes()))
                    }
                    None => Ok(None),
                }
            }
        }
    }
}

async fn read_chunk<R: AsyncReadExt + Unpin>(reader: &mut R) -> anyhow::Result<Option<Vec<u8>>> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let n = reader.read(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    buf.truncate(n);
    Ok(Some(buf))
}
