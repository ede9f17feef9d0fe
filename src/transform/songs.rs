use super::{DropCounts, DropReason};
use crate::models::{non_empty, opt_f64, opt_i64, ArtistRecord, RawSongRecord, SongRecord};

/// Songs and artists projected from the song-data files.
///
/// Every surviving record yields exactly one row in each list, so an artist
/// with several songs appears several times. The store's conflict policy
/// keeps the first one.
#[derive(Debug, Default)]
pub struct SongTables {
    pub songs: Vec<SongRecord>,
    pub artists: Vec<ArtistRecord>,
    pub dropped: DropCounts,
}

fn check_keys(record: &RawSongRecord) -> Result<(String, String), DropReason> {
    let song_id = non_empty(record.song_id.as_deref()).ok_or(DropReason::MissingSongId)?;
    let artist_id = non_empty(record.artist_id.as_deref()).ok_or(DropReason::MissingArtistId)?;
    Ok((song_id.to_string(), artist_id.to_string()))
}

pub fn transform_song_records(records: Vec<RawSongRecord>) -> SongTables {
    let mut tables = SongTables {
        songs: Vec::with_capacity(records.len()),
        artists: Vec::with_capacity(records.len()),
        dropped: DropCounts::default(),
    };

    for record in records {
        let (song_id, artist_id) = match check_keys(&record) {
            Ok(keys) => keys,
            Err(reason) => {
                tables.dropped.record(reason);
                continue;
            }
        };

        tables.songs.push(SongRecord {
            song_id,
            title: record.title,
            artist_id: artist_id.clone(),
            year: opt_i64(record.year.as_ref()).and_then(|year| i32::try_from(year).ok()),
            duration: opt_f64(record.duration.as_ref()),
        });
        tables.artists.push(ArtistRecord {
            artist_id,
            name: record.artist_name,
            location: record.artist_location,
            latitude: opt_f64(record.artist_latitude.as_ref()),
            longitude: opt_f64(record.artist_longitude.as_ref()),
        });
    }

    tables
}
