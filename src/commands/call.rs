use super::region_config;
use crate::cli::CallArgs;
use crate::phasing::{
    classifier::SampleCalls,
    reads::{ReadFilter, SiteCatalog},
    sample::{stream_samples_into_channel, Sample},
    workflows::{analyze_sample, Params},
    writers::TsvWriter,
};
use crate::utils::{create_writer, Result};
use crossbeam_channel::{bounded, Sender};
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use std::{collections::BTreeMap, sync::Arc, thread};

const CHANNEL_BUFFER_SIZE: usize = 256;

/// Result for the sample at a manifest index; `None` when it failed.
type IndexedResult = (usize, Option<(String, SampleCalls)>);

pub fn call(args: CallArgs) -> Result<()> {
    let region = region_config(&args.region)?;
    let sites = SiteCatalog::from_path(&args.sites_path)?;
    sites.check_site_count(region.num_sites)?;
    log::debug!("Loaded {} sites", sites.len());

    let mut tsv_writer = create_writer(&args.output_prefix, "tsv", TsvWriter::new)?;

    let (sender_sample, receiver_sample) = bounded(CHANNEL_BUFFER_SIZE);
    let manifest_path = args.manifest_path.clone();
    let sample_stream_thread =
        thread::spawn(move || stream_samples_into_channel(&manifest_path, sender_sample));

    let (sender_result, receiver_result) = bounded::<IndexedResult>(CHANNEL_BUFFER_SIZE);
    let writer_thread = thread::spawn(move || -> Result<usize> {
        // Results arrive out of order; rows are written in manifest order.
        let mut pending = BTreeMap::new();
        let mut next_index = 0;
        let mut num_written = 0;
        for (index, result) in &receiver_result {
            pending.insert(index, result);
            while let Some(result) = pending.remove(&next_index) {
                if let Some((sample_id, calls)) = result {
                    tsv_writer.write(&sample_id, &calls)?;
                    num_written += 1;
                }
                next_index += 1;
            }
        }
        tsv_writer.flush()?;
        Ok(num_written)
    });

    let workflow_params = Arc::new(Params {
        region,
        sites,
        read_filter: ReadFilter {
            min_mapq: args.min_mapq,
            min_baseq: args.min_baseq,
        },
    });

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );
    let pool = initialize_thread_pool(args.num_threads)?;
    pool.install(|| {
        receiver_sample
            .into_iter()
            .enumerate()
            .par_bridge()
            .for_each_with(&sender_result, |s, (index, sample_result)| {
                match sample_result {
                    Ok(sample) => process_sample(index, sample, &workflow_params, s),
                    Err(err) => {
                        log::error!("Sample processing: {:#}", err);
                        send_result(s, (index, None));
                    }
                }
            });
    });

    // Clean-up
    drop(sender_result);
    let num_written = writer_thread
        .join()
        .map_err(|_| "Writer thread panicked".to_string())??;
    log::trace!("Writer thread finished");
    sample_stream_thread
        .join()
        .map_err(|_| "Sample stream thread panicked".to_string())??;
    log::info!("Wrote calls for {} samples", num_written);

    Ok(())
}

fn process_sample(
    index: usize,
    sample: Sample,
    workflow_params: &Arc<Params>,
    sender_result: &Sender<IndexedResult>,
) {
    let result = match analyze_sample(&sample, workflow_params) {
        Ok(calls) => Some((sample.id, calls)),
        Err(err) => {
            log::error!("Error analyzing sample {}: {}", sample.id, err);
            None
        }
    };
    send_result(sender_result, (index, result));
}

fn send_result(sender_result: &Sender<IndexedResult>, result: IndexedResult) {
    if let Err(e) = sender_result.send(result) {
        log::error!("Failed to send sample result to writer thread: {}", e);
    }
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("gbaphase-{}", i))
        .start_handler(|_thread_index| {
            log::trace!("Initialized thread {:?}", std::thread::current().id());
        })
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
