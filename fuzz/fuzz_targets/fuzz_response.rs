// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use kb_sorter::categorize::{parse_response, sanitize, AllowLists, FALLBACK_PROJECT};

#[derive(Arbitrary, Debug)]
struct Input {
    reply: String,
    projects: Vec<String>,
    tags: Vec<String>,
}

fuzz_target!(|input: Input| {
    let lists = AllowLists::new(input.projects, input.tags);
    if let Ok(raw) = parse_response(&input.reply) {
        let result = sanitize(raw, &lists);
        assert!(result.project == FALLBACK_PROJECT || lists.projects.contains(&result.project));
        assert!(result.tags.iter().all(|t| lists.tags.contains(t)));
    }
});
