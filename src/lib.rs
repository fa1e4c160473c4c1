// ─── CraftCLI ───
// Command-line game-instance manager: resolves a version's dependency
// manifest (base plus layered loader patches), fetches the artifacts it
// requires with integrity checking, extracts platform natives, and
// assembles the process command line to launch the game.

pub mod cli;
pub mod commands;
pub mod core;
