// Packed creation timestamps for directory entries
// DOS-style 32-bit layout: year-1980 (7 bits), month (4), day (5), hour (5), minute (6), second/2 (5)
// The high half is stored as the entry's creation date, the low half as its creation time

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};

const YEAR_BASE: i32 = 1980;
const YEAR_MAX: i32 = YEAR_BASE + 0x7F;

/// Pack a calendar instant. Years outside 1980..=2107 are clamped.
pub fn pack_timestamp(datetime: &NaiveDateTime) -> u32 {
    let year = datetime.year().clamp(YEAR_BASE, YEAR_MAX);
    ((year - YEAR_BASE) as u32) << 25
        | datetime.month() << 21
        | datetime.day() << 16
        | datetime.hour() << 11
        | datetime.minute() << 5
        | (datetime.second() % 60) / 2
}

/// Unpack a timestamp. Returns `None` if the fields do not name a real instant.
pub fn unpack_timestamp(packed: u32) -> Option<NaiveDateTime> {
    let year = ((packed >> 25) & 0x7F) as i32 + YEAR_BASE;
    let month = (packed >> 21) & 0x0F;
    let day = (packed >> 16) & 0x1F;
    let hour = (packed >> 11) & 0x1F;
    let minute = (packed >> 5) & 0x3F;
    let second = (packed & 0x1F) * 2;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Split a packed timestamp into (date, time) halves
pub fn split_timestamp(packed: u32) -> (u16, u16) {
    ((packed >> 16) as u16, (packed & 0xFFFF) as u16)
}

/// Join (date, time) halves back into a packed timestamp
pub fn join_timestamp(date: u16, time: u16) -> u32 {
    (date as u32) << 16 | time as u32
}

/// Current local time as (date, time) halves
pub fn current_timestamp() -> (u16, u16) {
    split_timestamp(pack_timestamp(&Local::now().naive_local()))
}
