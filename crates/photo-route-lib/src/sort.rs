//! Capture-time ordering of photo collections

use crate::photo::PhotoRecord;

/// Order photos by resolved capture time, ascending.
///
/// Returns a new sequence and leaves the input untouched. Photos sharing a
/// timestamp keep their relative input order, so sorting an already sorted
/// sequence reproduces it exactly.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn sort_by_time<'a, I>(photos: I) -> Vec<&'a PhotoRecord>
where
    I: IntoIterator<Item = &'a PhotoRecord>,
{
    let mut keyed: Vec<(i64, usize, &'a PhotoRecord)> = photos
        .into_iter()
        .enumerate()
        .map(|(index, photo)| (photo.capture_time(), index, photo))
        .collect();

    // Explicit secondary key on the input index keeps ties in input order
    keyed.sort_by_key(|(timestamp, index, _)| (*timestamp, *index));
    keyed.into_iter().map(|(_, _, photo)| photo).collect()
}
