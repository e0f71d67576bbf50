//! CLI Exit Code Registry
//!
//! Single source of truth for `ctrsum` exit codes. Scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                                   |
//! |---------|------------|-----------------------------------------------|
//! | 0       | Universal  | Success (including "nothing to process")      |
//! | 1       | Universal  | General error (unspecified)                   |
//! | 2       | Universal  | CLI usage error (bad args, missing input)     |
//! | 3-9     | process    | Batch processing codes                        |
//! | 10-19   | ai         | AI provider/key codes                         |
//! | 20-29   | companies  | Company config codes                          |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, input path does not exist.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Process (3-9)
// =============================================================================

/// Summary workbook could not be written.
pub const EXIT_OUTPUT_WRITE: u8 = 3;

/// `--strict` and at least one input file was skipped.
pub const EXIT_FILES_SKIPPED: u8 = 4;

// =============================================================================
// AI (10-19)
// =============================================================================

/// AI requested but unavailable (provider=none, or built without `ai`).
pub const EXIT_AI_DISABLED: u8 = 10;

/// AI requested but no API key found.
pub const EXIT_AI_MISSING_KEY: u8 = 11;

// =============================================================================
// Companies (20-29)
// =============================================================================

/// Company config could not be read or written.
pub const EXIT_CONFIG_STORE: u8 = 20;
