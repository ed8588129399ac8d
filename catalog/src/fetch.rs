use std::sync::Arc;

use earth_gif_common::frame::{FetchedFrame, FrameDescriptor};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::client::{CatalogClient, CatalogError};

/// Download every frame in `descriptors`, at most `max_concurrent` at a time.
///
/// The result is in descriptor order regardless of completion order. The
/// first failure aborts all outstanding fetches and is returned; no partial
/// result is ever produced.
pub async fn fetch_all(
    client: Arc<CatalogClient>,
    descriptors: Vec<FrameDescriptor>,
    max_concurrent: usize,
) -> Result<Vec<FetchedFrame>, CatalogError> {
    // Resolve every archive path up front so a bad timestamp costs no requests.
    let jobs = descriptors
        .into_iter()
        .map(|descriptor| -> Result<_, CatalogError> {
            let archive_date = descriptor.archive_date()?;
            Ok((descriptor, archive_date))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total = jobs.len();
    let permits = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    info!(frames = total, max_concurrent, "retrieving frames");

    for (index, (descriptor, archive_date)) in jobs.into_iter().enumerate() {
        let client = Arc::clone(&client);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => client
                    .fetch_frame_bytes(&descriptor.image, &archive_date)
                    .await
                    .map_err(|e| CatalogError::Frame {
                        image: descriptor.image.clone(),
                        source: Box::new(e),
                    }),
                Err(e) => Err(CatalogError::Task(e.to_string())),
            };
            (index, descriptor, result)
        });
    }

    let mut slots: Vec<Option<FetchedFrame>> = vec![None; total];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, descriptor, Ok(bytes))) => {
                debug!(index, image = descriptor.image, bytes = bytes.len(), "frame fetched");
                slots[index] = Some(FetchedFrame::new(descriptor, bytes));
            }
            Ok((index, _, Err(e))) => {
                error!(index, error = %e, "frame fetch failed, cancelling remaining fetches");
                tasks.abort_all();
                return Err(e);
            }
            Err(e) => {
                tasks.abort_all();
                return Err(CatalogError::Task(e.to_string()));
            }
        }
    }

    let missing = slots.iter().filter(|slot| slot.is_none()).count();
    let frames: Option<Vec<FetchedFrame>> = slots.into_iter().collect();
    frames.ok_or(CatalogError::Incomplete { missing })
}
