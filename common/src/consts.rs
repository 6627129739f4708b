/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::ops::RangeInclusive;

pub const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_CONTENT_LENGTH: usize = 10_000;
pub const MAX_POLL_TEXT_ANSWER_LENGTH: usize = 2000;
pub const MAX_POLL_OPTIONS: usize = 20;

pub const RATING_BOUNDS: RangeInclusive<i32> = 0..=10;

/// Used for feedback analytics when no keywords are configured.
pub const DEFAULT_ANALYTICS_KEYWORDS: [&str; 10] = [
    "حقوق",
    "مرخصی",
    "بیمه",
    "اضافه کاری",
    "محیط کار",
    "سرویس",
    "غذا",
    "آموزش",
    "ارتقا",
    "مدیریت",
];

pub const MBTI_PAIRS: [(&str, &str); 4] = [("E", "I"), ("S", "N"), ("T", "F"), ("J", "P")];
pub const DISC_DIMENSIONS: [&str; 4] = ["D", "I", "S", "C"];
pub const HOLLAND_DIMENSIONS: [&str; 6] = ["R", "I", "A", "S", "E", "C"];
