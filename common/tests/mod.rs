/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Test modules for common crate

pub mod database_tests;
pub mod input_tests;
pub mod permission_tests;
pub mod polls_tests;
