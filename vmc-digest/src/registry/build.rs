//! Building a registry from FASTA.
//!
//! With one thread the FASTA text is streamed through a
//! [`FastaStreamDigester`], so memory stays flat regardless of sequence
//! length. With more threads, whole records are batched into chunks and
//! digested by a worker pool; results are reordered so the persisted file
//! always follows FASTA order.

use std::collections::BTreeMap;
use std::io::{BufRead, ErrorKind, Read};
use std::path::Path;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, bounded};
use log::{debug, info, warn};

use vmc_core::{Result, VmcError};

use super::file::{RegistryEntry, RegistryWriter};
use super::{RegistryOptions, SequenceRegistry};
use crate::composer::IdentifierComposer;
use crate::digest::DigestLength;
use crate::fasta::{FastaReader, open_fasta};
use crate::models::SequenceHandle;
use crate::stream::FastaStreamDigester;

const READ_CHUNK_SIZE: usize = 256 * 1024;

type Chunk = (usize, Vec<SequenceHandle>);
type Digested = Result<(usize, Vec<RegistryEntry>)>;

/// Destination for finished entries: the persisted file and the in-memory map.
struct RegistrySink {
    writer: RegistryWriter,
    registry: SequenceRegistry,
}

impl RegistrySink {
    fn accept(&mut self, entry: RegistryEntry) -> Result<()> {
        self.writer.write_entry(&entry)?;
        self.registry.insert_entry(&entry);
        Ok(())
    }
}

/// Digest every record of `fasta`, persist the result to `registry_path`
/// and return the in-memory registry.
///
/// The file is written to a temporary path and only moved into place once
/// every record has been digested.
pub fn build_registry<P: AsRef<Path>, Q: AsRef<Path>>(
    fasta: P,
    registry_path: Q,
    options: &RegistryOptions,
) -> Result<SequenceRegistry> {
    options.validate()?;
    let fasta = fasta.as_ref();
    let started = Instant::now();

    let mut sink = RegistrySink {
        writer: RegistryWriter::create(registry_path)?,
        registry: SequenceRegistry::new(),
    };

    let outcome = if options.threads == 1 {
        build_streaming(fasta, options.digest_length, &mut sink)
    } else {
        build_parallel(fasta, options, &mut sink)
    };

    let RegistrySink { writer, registry } = sink;
    if let Err(e) = outcome {
        if let Err(cleanup) = writer.discard() {
            warn!("Could not remove partial registry file: {}", cleanup);
        }
        return Err(e);
    }

    let written = writer.written();
    let path = writer.commit()?;
    info!(
        "Digested {} sequences ({} unique names) into {:?} in {:.2?}",
        written,
        registry.len(),
        path,
        started.elapsed()
    );
    Ok(registry)
}

fn build_streaming(fasta: &Path, length: DigestLength, sink: &mut RegistrySink) -> Result<()> {
    let mut reader = open_fasta(fasta)?;
    let mut digester = FastaStreamDigester::new(length);
    let mut buf = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        digester.update(&buf[..n])?;
        for entry in digester.drain_completed() {
            debug!("{} -> {}", entry.name, entry.sequence_id);
            sink.accept(entry)?;
        }
    }

    for entry in digester.finish()? {
        debug!("{} -> {}", entry.name, entry.sequence_id);
        sink.accept(entry)?;
    }
    Ok(())
}

fn build_parallel(fasta: &Path, options: &RegistryOptions, sink: &mut RegistrySink) -> Result<()> {
    let reader = FastaReader::new(open_fasta(fasta)?);
    let workers = options.threads;
    let composer = IdentifierComposer::new(options.digest_length);
    let (chunk_max_records, chunk_max_bytes) = (options.chunk_records.max(1), options.chunk_bytes.max(1));

    let (chunk_tx, chunk_rx) = bounded::<Chunk>(workers * 2);
    let (result_tx, result_rx) = bounded::<Digested>(workers * 2);

    debug!("Digesting {:?} with {} workers", fasta, workers);

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers + 1);

        let producer_errors = result_tx.clone();
        handles.push(scope.spawn(move || {
            produce_chunks(
                reader,
                chunk_tx,
                producer_errors,
                chunk_max_records,
                chunk_max_bytes,
            )
        }));

        for _ in 0..workers {
            let chunks = chunk_rx.clone();
            let results = result_tx.clone();
            let composer = &composer;
            handles.push(scope.spawn(move || digest_chunks(composer, chunks, results)));
        }
        drop(chunk_rx);
        drop(result_tx);

        let outcome = collect_in_order(result_rx, sink);

        for handle in handles {
            if let Err(panic) = handle.join() {
                std::panic::resume_unwind(panic);
            }
        }
        outcome
    })
}

/// Read records and hand them out in bounded chunks. A FASTA error is
/// forwarded to the collector; a closed channel means the collector gave up.
fn produce_chunks<R: BufRead>(
    reader: FastaReader<R>,
    chunks: Sender<Chunk>,
    errors: Sender<Digested>,
    max_records: usize,
    max_bytes: usize,
) {
    let mut index = 0;
    let mut batch = Vec::new();
    let mut batch_bytes = 0;

    for record in reader {
        let handle = match record {
            Ok(handle) => handle,
            Err(e) => {
                let _ = errors.send(Err(e));
                return;
            }
        };
        batch_bytes += handle.content.len();
        batch.push(handle);

        if batch.len() >= max_records || batch_bytes >= max_bytes {
            if chunks.send((index, std::mem::take(&mut batch))).is_err() {
                return;
            }
            index += 1;
            batch_bytes = 0;
        }
    }

    if !batch.is_empty() {
        let _ = chunks.send((index, batch));
    }
}

fn digest_chunks(composer: &IdentifierComposer, chunks: Receiver<Chunk>, results: Sender<Digested>) {
    for (index, handles) in chunks {
        let entries = handles
            .into_iter()
            .map(|handle| {
                let sequence_id = composer.compose_sequence_id(&handle);
                RegistryEntry {
                    name: handle.name,
                    sequence_id,
                    description: handle.description,
                }
            })
            .collect();
        if results.send(Ok((index, entries))).is_err() {
            return;
        }
    }
}

/// Drain worker results, releasing chunks to the sink strictly by index.
fn collect_in_order(results: Receiver<Digested>, sink: &mut RegistrySink) -> Result<()> {
    let mut pending: BTreeMap<usize, Vec<RegistryEntry>> = BTreeMap::new();
    let mut next = 0;

    for message in results {
        let (index, entries) = message?;
        pending.insert(index, entries);

        while let Some(entries) = pending.remove(&next) {
            for entry in entries {
                debug!("{} -> {}", entry.name, entry.sequence_id);
                sink.accept(entry)?;
            }
            next += 1;
        }
    }

    if let Some(index) = pending.keys().next() {
        return Err(VmcError::FastaParse(format!(
            "digest chunk {} was never produced; worker exited early (next expected {})",
            index, next
        )));
    }
    Ok(())
}
