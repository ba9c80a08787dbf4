//! Background photo uploads.
//!
//! Decoding and re-encoding a camera photo takes far longer than a frame, so
//! [`UploadQueue`] hands the work to a single worker thread and the frame
//! loop collects finished uploads with [`UploadQueue::commit_ready`]. Jobs
//! are processed and delivered in submission order, and only successful
//! uploads reach [`TreeStore::add_photo`], so the store's photo count stays
//! the single source of insertion indices.
//!
//! A failed upload is logged and dropped. There is no retry and no
//! cancellation.

use crate::error::UploadError;
use crate::polaroid::{render_polaroid, Polaroid, PolaroidLayout};
use crate::state::{PhotoId, TreeStore};
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Handle for one submitted upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadTicket(u64);

impl UploadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What the worker was asked to process.
#[derive(Debug)]
enum Source {
    Bytes(Vec<u8>),
    File(PathBuf),
}

#[derive(Debug)]
struct Job {
    ticket: UploadTicket,
    source: Source,
}

/// A finished upload, successful or not.
#[derive(Debug)]
pub struct Completed {
    pub ticket: UploadTicket,
    /// The finished polaroid, or why it could not be produced.
    pub result: Result<Polaroid, UploadError>,
}

/// A photo that made it into the store, with pixels ready for a texture.
#[derive(Debug)]
pub struct CommittedPhoto {
    pub id: PhotoId,
    pub pixels: RgbaImage,
}

/// Runs uploads on a worker thread and delivers them back to the frame loop.
pub struct UploadQueue {
    jobs: Option<Sender<Job>>,
    results: Receiver<Completed>,
    worker: Option<JoinHandle<()>>,
    next_ticket: u64,
    in_flight: usize,
}

impl UploadQueue {
    /// Start a queue that composes polaroids with the default layout.
    pub fn new() -> Self {
        Self::with_layout(PolaroidLayout::default())
    }

    /// Start a queue with a custom polaroid layout.
    pub fn with_layout(layout: PolaroidLayout) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (result_tx, result_rx) = mpsc::channel::<Completed>();

        let worker = thread::Builder::new()
            .name("tinsel-upload".into())
            .spawn(move || {
                for job in job_rx {
                    let result = match job.source {
                        Source::Bytes(bytes) => render_polaroid(&bytes, &layout),
                        Source::File(path) => std::fs::read(&path)
                            .map_err(Into::into)
                            .and_then(|bytes| render_polaroid(&bytes, &layout)),
                    };
                    let completed = Completed {
                        ticket: job.ticket,
                        result: result.map_err(UploadError::from),
                    };
                    if result_tx.send(completed).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| log::warn!("could not start upload worker: {}", e))
            .ok();

        Self {
            jobs: worker.as_ref().map(|_| job_tx),
            results: result_rx,
            worker,
            next_ticket: 0,
            in_flight: 0,
        }
    }

    /// Number of uploads submitted but not yet collected.
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Queue raw image bytes.
    pub fn submit_bytes(&mut self, bytes: Vec<u8>) -> UploadTicket {
        self.submit(Source::Bytes(bytes))
    }

    /// Queue an image file; it is read on the worker thread.
    pub fn submit_file(&mut self, path: impl Into<PathBuf>) -> UploadTicket {
        self.submit(Source::File(path.into()))
    }

    fn submit(&mut self, source: Source) -> UploadTicket {
        let ticket = UploadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight += 1;

        let sent = self
            .jobs
            .as_ref()
            .map(|jobs| jobs.send(Job { ticket, source }).is_ok())
            .unwrap_or(false);
        if !sent {
            // Reported as WorkerGone by the next poll.
            self.jobs = None;
        }
        log::debug!("upload {} queued", ticket.0);
        ticket
    }

    /// Collect every upload that has finished, without blocking.
    pub fn poll(&mut self) -> Vec<Completed> {
        let mut done = Vec::new();
        loop {
            match self.results.try_recv() {
                Ok(completed) => {
                    self.in_flight -= 1;
                    done.push(completed);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.abandon_in_flight(&mut done);
                    break;
                }
            }
        }
        done
    }

    /// Block until the next upload finishes or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<Completed> {
        if self.in_flight == 0 {
            return None;
        }
        match self.results.recv_timeout(timeout) {
            Ok(completed) => {
                self.in_flight -= 1;
                Some(completed)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                let mut done = Vec::new();
                self.abandon_in_flight(&mut done);
                done.into_iter().next()
            }
        }
    }

    /// Commit finished uploads to the store. Failures are logged and dropped.
    ///
    /// Returns the photos that were added, in commit order.
    pub fn commit_ready(&mut self, store: &mut TreeStore, now: Instant) -> Vec<CommittedPhoto> {
        self.poll()
            .into_iter()
            .filter_map(|completed| commit(completed, store, now))
            .collect()
    }

    fn abandon_in_flight(&mut self, done: &mut Vec<Completed>) {
        // Tickets are not tracked individually once the worker is gone.
        for _ in 0..self.in_flight {
            done.push(Completed {
                ticket: UploadTicket(u64::MAX),
                result: Err(UploadError::WorkerGone),
            });
        }
        self.in_flight = 0;
    }
}

/// Commit one finished upload. Returns the new photo, if one was added.
pub fn commit(completed: Completed, store: &mut TreeStore, now: Instant) -> Option<CommittedPhoto> {
    match completed.result {
        Ok(Polaroid { data_uri, pixels }) => {
            let id = store.add_photo(data_uri, now).id.clone();
            Some(CommittedPhoto { id, pixels })
        }
        Err(e) => {
            log::warn!("upload {} dropped: {}", completed.ticket.0, e);
            None
        }
    }
}

impl Default for UploadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UploadQueue {
    fn drop(&mut self) {
        self.jobs = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
