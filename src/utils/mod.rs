//! Cross-cutting helpers shared by the operation modules.

pub mod parallel;
