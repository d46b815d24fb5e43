pub mod rtc;
pub mod scheduler;

use rtc::{ConsoleModel, Rtc};
use scheduler::Scheduler;

pub struct IO {
    pub scheduler: Scheduler,
    pub rtc: Rtc,
}

impl IO {
    pub fn new(model: ConsoleModel) -> IO {
        let mut scheduler = Scheduler::new();
        let rtc = Rtc::new(model, &mut scheduler);
        IO {
            scheduler,
            rtc,
        }
    }
}

impl MemoryHandler for IO {
    fn read8(&self, addr: u32) -> u8 {
        match addr {
            0x04000138 => self.rtc.read() as u8,
            0x04000139 => (self.rtc.read() >> 8) as u8,
            _ => { warn!("Reading Unimplemented IO Register at {:08X}", addr); 0 }
        }
    }

    fn write8(&mut self, addr: u32, value: u8) {
        match addr {
            0x04000138 => self.rtc.write(value as u16, true),
            0x04000139 => (), // upper byte only changes through halfword writes
            _ => warn!("Writing Unimplemented IO Register at {:08X} = {:02X}", addr, value),
        }
    }

    fn read16(&self, addr: u32) -> u16 {
        match addr {
            0x04000138 => self.rtc.read(),
            _ => (self.read8(addr + 0) as u16) << 0 | (self.read8(addr + 1) as u16) << 8,
        }
    }

    fn write16(&mut self, addr: u32, value: u16) {
        match addr {
            0x04000138 => self.rtc.write(value, false),
            _ => {
                self.write8(addr + 0, (value >> 0) as u8);
                self.write8(addr + 1, (value >> 8) as u8);
            }
        }
    }
}

pub trait MemoryHandler {
    fn read8(&self, addr: u32) -> u8;
    fn write8(&mut self, addr: u32, value: u8);

    fn read16(&self, addr: u32) -> u16 {
        (self.read8(addr + 0) as u16) << 0 |
        (self.read8(addr + 1) as u16) << 8
    }
    fn write16(&mut self, addr: u32, value: u16) {
        self.write8(addr + 0, (value >> 0) as u8);
        self.write8(addr + 1, (value >> 8) as u8);
    }
}
