//! Known records shared by the end-to-end tests

#![allow(dead_code)]

pub const SONG_1_ID: &str = "SOSITYK12A8C13765E";
pub const SONG_1_TITLE: &str = "Mother of All...";
pub const SONG_1_DURATION: f64 = 244.3;

pub const ARTIST_1_ID: &str = "ARUKJUP12086C1411F";
pub const ARTIST_1_NAME: &str = "Elena";
pub const ARTIST_1_LOCATION: &str = "Dubai UAE";

pub const USER_1_ID: i64 = 8;
pub const USER_1_FIRST_NAME: &str = "Kaylee";

/// 2018-11-01 20:57:10.796 UTC
pub const PLAY_1_TS: i64 = 1541105830796;
/// 2018-11-01 21:01:46.796 UTC
pub const PLAY_2_TS: i64 = 1541106106796;
