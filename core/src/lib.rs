#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod io;
pub mod savestate;

// ARM7 bus clock; all timer delays are derived from it
pub const CLOCK_FREQ: i32 = 33_513_982;
