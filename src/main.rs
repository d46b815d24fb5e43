use log::LevelFilter;
use simplelog::{Config, SimpleLogger};

use rtc_core::io::rtc::ConsoleModel;
use rtc_core::io::{MemoryHandler, IO};

const RTC_ADDR: u32 = 0x04000138;

const DATA: u16 = 1 << 0;
const CLOCK: u16 = 1 << 1;
const SELECT: u16 = 1 << 2;
const DRIVE_OUT: u16 = 1 << 4;

fn clock_byte_in(io: &mut IO, val: u8) {
    for bit in 0..8 {
        let data = (val >> bit & 1) as u16;
        io.write16(RTC_ADDR, SELECT | DRIVE_OUT | data);
        io.write16(RTC_ADDR, SELECT | DRIVE_OUT | CLOCK | data);
    }
}

fn clock_byte_out(io: &mut IO) -> u8 {
    let mut val = 0;
    for bit in 0..8 {
        io.write16(RTC_ADDR, SELECT);
        val |= ((io.read16(RTC_ADDR) & DATA) as u8) << bit;
        io.write16(RTC_ADDR, SELECT | CLOCK);
    }
    val
}

fn read_date_time(io: &mut IO) -> [u8; 7] {
    io.write16(RTC_ADDR, SELECT | CLOCK | DRIVE_OUT);
    clock_byte_in(io, 0x65); // "read date and time" in its MSB-first encoding
    let mut out = [0; 7];
    for byte in out.iter_mut() {
        *byte = clock_byte_out(io);
    }
    io.write16(RTC_ADDR, CLOCK | DRIVE_OUT);
    out
}

fn main() {
    SimpleLogger::init(LevelFilter::Debug, Config::default()).unwrap();

    let mut io = IO::new(ConsoleModel::Ds);
    io.rtc.set_date_time(2008, 11, 21, 12, 30, 0);

    // run a few emulated seconds, then read the calendar back over the wire
    while io.scheduler.cycle < 3 * rtc_core::CLOCK_FREQ as u64 {
        io.skip_to_next_event();
    }

    let raw = read_date_time(&mut io);
    let (year, month, day, hour, minute, second) = io.rtc.get_date_time();
    println!("raw date/time bytes: {:02X?}", raw);
    println!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", year, month, day, hour, minute, second);
}
