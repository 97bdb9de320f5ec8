//! The sender's sliding-window state machine: transmit fragments under a
//! bounded window, retransmit Go-Back-N style on timeout, consume
//! cumulative acks, and signal end-of-stream once the peer has
//! acknowledged everything.
//!
//! Grounded on the teacher's `association/association_internal.rs`
//! retransmit-on-timeout path (a full RTO manager here is reduced to a
//! single fixed timeout) and `queue/pending_queue.rs` for the shape of
//! the in-flight window.

mod window;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{Error, Result};
use crate::packet::{Packet, HEADER_SIZE};
use window::SendWindow;

/// How long the transmission task sleeps between window iterations.
/// A simplification of a deadline-driven wait (block on whichever of
/// "new ack received" or "head packet age reaches the timeout" comes
/// first); kept here as a plain poll.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Drives one sender session to completion over `stream`.
///
/// Fragments must all be the same length (the negotiated maximum
/// payload size) except that the list must be non-empty — the
/// `Fragmenter` guarantees this, including for an empty message.
///
/// Returns `Ok(())` once the terminator has been sent and the
/// ack-intake task has exited normally. Fails with
/// [`Error::TransmissionAborted`] on local I/O failure or
/// [`Error::PeerClosed`] if the stream ends before termination.
pub async fn run<S>(
    stream: S,
    fragments: Vec<Bytes>,
    window_size: usize,
    timeout: Duration,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    assert!(window_size >= 1, "window size must be at least 1");
    assert!(!fragments.is_empty(), "fragment list must be non-empty");

    let max_payload_size = fragments[0].len();
    let final_seq = (fragments.len() - 1) as u32;

    let (read_half, write_half) = tokio::io::split(stream);
    let write_half = Arc::new(Mutex::new(write_half));
    let last_ack = Arc::new(Mutex::new(-1i64));
    let stop = Arc::new(AtomicBool::new(false));

    let mut tx_handle = tokio::spawn(transmission_task(
        write_half.clone(),
        fragments,
        window_size,
        timeout,
        last_ack.clone(),
        stop.clone(),
        final_seq,
    ));

    let mut ack_handle = tokio::spawn(ack_intake_task(
        read_half,
        write_half,
        last_ack,
        stop,
        final_seq,
        max_payload_size,
    ));

    // Whichever task finishes first decides the outcome; the other is
    // aborted rather than awaited, since setting `stop` alone cannot
    // unblock a task parked in a pending socket read or write.
    let (first, second) = tokio::select! {
        result = &mut tx_handle => {
            ack_handle.abort();
            (result, ack_handle.await)
        }
        result = &mut ack_handle => {
            tx_handle.abort();
            (tx_handle.await, result)
        }
    };

    let tx_result = match first {
        Ok(r) => r,
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    };
    let ack_result = match second {
        Ok(r) => r,
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    };

    // The ack-intake task is the authority on whether the session
    // completed: `run` succeeds only once it has observed the final
    // cumulative ack and sent the terminator.
    ack_result?;
    tx_result?;
    Ok(())
}

fn now_secs(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}

#[allow(clippy::too_many_arguments)]
async fn transmission_task<W>(
    write_half: Arc<Mutex<W>>,
    fragments: Vec<Bytes>,
    window_size: usize,
    timeout: Duration,
    last_ack: Arc<Mutex<i64>>,
    stop: Arc<AtomicBool>,
    final_seq: u32,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let start = Instant::now();
    let mut window = SendWindow::new(window_size);

    loop {
        let cur_ack = *last_ack.lock().await;
        if stop.load(Ordering::Acquire) || cur_ack == final_seq as i64 {
            break;
        }

        window.retire_acked(cur_ack);

        if !window.is_full() {
            let next_seq = match window.back() {
                Some(p) => p.seq_num + 1,
                None => (cur_ack + 1) as u32,
            };

            if next_seq <= final_seq {
                let can_send = window
                    .remaining_capacity()
                    .min((final_seq - next_seq + 1) as usize);

                for i in 0..can_send {
                    let seq = next_seq + i as u32;
                    let packet = Packet {
                        seq_num: seq,
                        ack_msg: false,
                        timestamp: now_secs(start),
                        payload: fragments[seq as usize].clone(),
                    };
                    send_packet(&write_half, &packet).await?;
                    log::trace!("sender: sent data packet seq={seq}");
                    window.push(packet);
                }
            }
        }

        let should_retransmit = match window.front() {
            Some(head) => now_secs(start) - head.timestamp > timeout.as_secs_f64(),
            None => false,
        };
        if should_retransmit {
            log::debug!("sender: timeout elapsed, retransmitting window");
            let now = now_secs(start);
            // Collect before awaiting writes so `window` isn't borrowed
            // across the lock acquisitions below.
            let to_resend: Vec<Packet> = window
                .iter_mut()
                .map(|p| {
                    p.timestamp = now;
                    p.clone()
                })
                .collect();
            for packet in &to_resend {
                send_packet(&write_half, packet).await?;
                log::trace!("sender: retransmitted seq={}", packet.seq_num);
            }
        }

        sleep(POLL_INTERVAL).await;
    }

    Ok(())
}

async fn ack_intake_task<R, W>(
    mut read_half: R,
    write_half: Arc<Mutex<W>>,
    last_ack: Arc<Mutex<i64>>,
    stop: Arc<AtomicBool>,
    final_seq: u32,
    max_payload_size: usize,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let start = Instant::now();
    let mut header_buf = [0u8; HEADER_SIZE];

    loop {
        if let Err(e) = read_exact_or_peer_closed(&mut read_half, &mut header_buf).await {
            stop.store(true, Ordering::Release);
            return Err(e);
        }

        let ack_packet = Packet::unpack(&header_buf, Bytes::new())?;
        let ack_number = ack_packet.seq_num as i64;
        log::debug!("sender: ack {ack_number} received");

        let mut guard = last_ack.lock().await;
        if ack_number > *guard {
            *guard = ack_number;
        }
        let current = *guard;
        drop(guard);

        if current == final_seq as i64 {
            let terminator = Packet {
                seq_num: final_seq + 1,
                ack_msg: true,
                timestamp: now_secs(start),
                payload: Bytes::from(vec![b' '; max_payload_size]),
            };
            send_packet(&write_half, &terminator).await?;
            log::debug!("sender: all fragments acknowledged, terminator sent");
            stop.store(true, Ordering::Release);
            return Ok(());
        }
    }
}

async fn send_packet<W>(write_half: &Arc<Mutex<W>>, packet: &Packet) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut w = write_half.lock().await;
    w.write_all(&packet.pack()).await?;
    Ok(())
}

/// Reads exactly `buf.len()` bytes, mapping a clean EOF to
/// [`Error::PeerClosed`] rather than a generic I/O error.
async fn read_exact_or_peer_closed<R>(reader: &mut R, buf: &mut [u8]) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(Error::PeerClosed),
        Err(e) => Err(Error::TransmissionAborted(e)),
    }
}
