mod registers;


use super::scheduler::{EventType, Scheduler};
use crate::savestate::RtcSave;
use crate::CLOCK_FREQ;

pub use registers::StateData;

bitflags! {
    struct Pins: u16 {
        const DATA = 1 << 0;
        const CLOCK = 1 << 1;
        const SELECT = 1 << 2;
        const DRIVE_OUT = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConsoleModel {
    Ds,
    Dsi,
}

pub struct Rtc {
    model: ConsoleModel,
    // host-visible register mirror
    pub(crate) io: u16,
    // transfer state
    pub(crate) input: u8,
    pub(crate) input_bit: u32,
    pub(crate) input_pos: u32,
    pub(crate) output: [u8; 8],
    pub(crate) output_bit: u32,
    pub(crate) output_pos: u32,
    pub(crate) cur_cmd: u8,
    // chip registers
    pub(crate) state: StateData,
    // 32768Hz quartz timing
    pub(crate) timer_error: i32,
    pub(crate) clock_count: u32,
}

impl Rtc {
    const FAMILY_STANDARD: u8 = 0x06;
    const FAMILY_EXTENDED: u8 = 0x0E;

    // the wire transmits the command nibble bit-reversed
    fn reverse4(val: u8) -> u8 {
        (val & 0x1) << 3 | (val & 0x2) << 1 | (val & 0x4) >> 1 | (val & 0x8) >> 3
    }

    pub fn new(model: ConsoleModel, scheduler: &mut Scheduler) -> Rtc {
        let mut rtc = Rtc {
            model,
            io: 0,
            input: 0,
            input_bit: 0,
            input_pos: 0,
            output: [0; 8],
            output_bit: 0,
            output_pos: 0,
            cur_cmd: 0,
            state: StateData::new(),
            timer_error: 0,
            clock_count: 0,
        };
        rtc.reset(scheduler);
        rtc
    }

    // hardware reset: only transfer state is cleared, the backup battery keeps the calendar
    pub fn reset(&mut self, scheduler: &mut Scheduler) {
        self.input = 0;
        self.input_bit = 0;
        self.input_pos = 0;

        self.output = [0; 8];
        self.output_bit = 0;
        self.output_pos = 0;

        self.cur_cmd = 0;

        self.clock_count = 0;
        self.schedule_timer(scheduler, true);
    }

    pub fn read(&self) -> u16 {
        self.io
    }

    pub fn write(&mut self, value: u16, byte: bool) {
        let value = if byte { value | self.io & 0xFF00 } else { value };
        let pins = Pins::from_bits_truncate(value);

        if pins.contains(Pins::SELECT) {
            if self.io & Pins::SELECT.bits() == 0 {
                // chip-select went high: new transfer
                self.input = 0;
                self.input_bit = 0;
                self.input_pos = 0;

                self.output = [0; 8];
                self.output_bit = 0;
                self.output_pos = 0;
            } else if !pins.contains(Pins::CLOCK) {
                if pins.contains(Pins::DRIVE_OUT) {
                    if pins.contains(Pins::DATA) {
                        self.input |= 1 << self.input_bit;
                    }
                    self.input_bit += 1;
                    if self.input_bit >= 8 {
                        self.input_bit = 0;
                        let input = self.input;
                        self.input = 0;
                        self.byte_in(input);
                        self.input_pos += 1;
                    }
                } else {
                    if self.output[self.output_pos as usize] >> self.output_bit & 1 != 0 {
                        self.io |= Pins::DATA.bits();
                    } else {
                        self.io &= !Pins::DATA.bits();
                    }
                    self.output_bit += 1;
                    if self.output_bit >= 8 {
                        self.output_bit = 0;
                        if self.output_pos < 7 { self.output_pos += 1 }
                    }
                }
            }
        }

        if pins.contains(Pins::DRIVE_OUT) {
            self.io = value;
        } else {
            self.io = self.io & Pins::DATA.bits() | value & !Pins::DATA.bits();
        }
    }

    fn byte_in(&mut self, val: u8) {
        if self.input_pos == 0 {
            // commands normally arrive LSB first; in the MSB-first encoding the
            // family code lands in the high nibble and the byte gets bit-reversed
            self.cur_cmd = if val >> 4 == Rtc::FAMILY_STANDARD {
                Rtc::reverse4(val & 0xF) << 4 | Rtc::FAMILY_STANDARD
            } else {
                val
            };

            if self.model == ConsoleModel::Dsi {
                // same quirk for the extended command set; 0x76/0x77 stay as they
                // are since 0x76 is already a valid standard-family command
                if self.cur_cmd & 0xF0 == 0x70 && self.cur_cmd & 0xFE != 0x76 {
                    self.cur_cmd = Rtc::reverse4(self.cur_cmd & 0xF) << 4 | Rtc::FAMILY_EXTENDED;
                }
            }

            if self.cur_cmd & 0x80 != 0 {
                self.cmd_read();
            }
            return;
        }

        self.cmd_write(val);
    }

    fn cmd_read(&mut self) {
        let family = self.cur_cmd & 0x0F;
        let select = self.cur_cmd >> 4 & 0x7;

        if family == Rtc::FAMILY_EXTENDED && self.model != ConsoleModel::Dsi {
            debug!("RTC: unknown read command {:02X}", self.cur_cmd);
            return;
        }

        match Register::decode(family, select) {
            Some(Register::StatusReg1) => {
                self.output[0] = self.state.status_reg1;
                // bits 4-7 auto-clear on read
                self.state.status_reg1 &= 0x0F;
            }
            Some(Register::StatusReg2) => self.output[0] = self.state.status_reg2,
            Some(Register::DateTime) => self.output[..7].copy_from_slice(&self.state.date_time),
            Some(Register::Time) => self.output[..3].copy_from_slice(&self.state.date_time[4..7]),
            Some(Register::Alarm1) => {
                if self.state.status_reg2 & StateData::STAT2_ALARM1_DATE != 0 {
                    self.output[..3].copy_from_slice(&self.state.alarm1);
                } else {
                    self.output[0] = self.state.alarm1[2];
                }
            }
            Some(Register::Alarm2) => self.output[..3].copy_from_slice(&self.state.alarm2),
            Some(Register::ClockAdjust) => self.output[0] = self.state.clock_adjust,
            Some(Register::FreeReg) => self.output[0] = self.state.free_reg,
            Some(Register::MinuteCount) => {
                // big-endian 24 bits of the 32-bit counter
                self.output[0] = (self.state.minute_count >> 16) as u8;
                self.output[1] = (self.state.minute_count >> 8) as u8;
                self.output[2] = self.state.minute_count as u8;
            }
            Some(Register::Fout1) => self.output[0] = self.state.fout1,
            Some(Register::Fout2) => self.output[0] = self.state.fout2,
            Some(Register::AlarmDate1) => self.output[..3].copy_from_slice(&self.state.alarm_date1),
            Some(Register::AlarmDate2) => self.output[..3].copy_from_slice(&self.state.alarm_date2),
            None => debug!("RTC: unknown read command {:02X}", self.cur_cmd),
        }
    }

    fn cmd_write(&mut self, val: u8) {
        let family = self.cur_cmd & 0x0F;
        let select = self.cur_cmd >> 4 & 0x7;
        let pos = self.input_pos as usize;

        if family == Rtc::FAMILY_EXTENDED && self.model != ConsoleModel::Dsi {
            debug!("RTC: unknown write command {:02X}", self.cur_cmd);
            return;
        }

        // payload bytes past a register's length fall on the floor, like the chip
        match Register::decode(family, select) {
            Some(Register::StatusReg1) if pos == 1 => self.write_status_reg1(val),
            Some(Register::StatusReg2) if pos == 1 => {
                self.state.status_reg2 = val;
                if val & StateData::STAT2_INT_MASK != 0 {
                    info!(
                        "RTC: alarm interrupt enabled: {:02X}, {:02X?} {:02X?}",
                        val, self.state.alarm1, self.state.alarm2
                    );
                }
            }
            Some(Register::DateTime) if pos <= 7 => self.state.write_date_time(pos - 1, val),
            Some(Register::Time) if pos <= 3 => self.state.write_date_time(pos + 3, val),
            Some(Register::Alarm1) => {
                if self.state.status_reg2 & StateData::STAT2_ALARM1_DATE != 0 {
                    if pos <= 3 { self.state.alarm1[pos - 1] = val }
                } else if pos == 1 {
                    self.state.alarm1[2] = val;
                }
            }
            Some(Register::Alarm2) => if pos <= 3 { self.state.alarm2[pos - 1] = val },
            Some(Register::ClockAdjust) if pos == 1 => {
                self.state.clock_adjust = val;
                debug!("RTC: clock adjust = {:02X}", val);
            }
            Some(Register::FreeReg) if pos == 1 => self.state.free_reg = val,
            Some(Register::MinuteCount) => debug!("RTC: write to read-only minute counter"),
            Some(Register::Fout1) if pos == 1 => self.state.fout1 = val,
            Some(Register::Fout2) if pos == 1 => self.state.fout2 = val,
            Some(Register::AlarmDate1) => if pos <= 3 { self.state.alarm_date1[pos - 1] = val },
            Some(Register::AlarmDate2) => if pos <= 3 { self.state.alarm_date2[pos - 1] = val },
            Some(_) => (),
            None => debug!("RTC: unknown write command {:02X}", self.cur_cmd),
        }
    }

    fn write_status_reg1(&mut self, val: u8) {
        let old = self.state.status_reg1;

        if val & StateData::STAT1_RESET != 0 {
            // command reset wipes the whole register bank, calendar included
            self.state.reset();
        }

        self.state.status_reg1 = self.state.status_reg1 & 0xF0 | val & 0x0E;

        if (self.state.status_reg1 ^ old) & StateData::STAT1_HOUR24 != 0 {
            self.state.reencode_hour();
        }
    }

    fn schedule_timer(&mut self, scheduler: &mut Scheduler, first: bool) {
        if first { self.timer_error = 0 }

        // the quartz runs at 32768Hz; carrying the division remainder keeps the
        // long-run average exact even though CLOCK_FREQ is not a multiple of it
        let sysclock = CLOCK_FREQ + self.timer_error;
        let delay = sysclock >> 15;
        self.timer_error = sysclock & 0x7FFF;

        scheduler.schedule(EventType::RtcTick, delay as u64);
    }

    pub fn clock_timer(&mut self, scheduler: &mut Scheduler) {
        self.clock_count = self.clock_count.wrapping_add(1);

        if self.clock_count & 0x7FFF == 0 {
            self.state.count_second();
        }

        self.schedule_timer(scheduler, false);
    }

    pub fn state(&self) -> StateData {
        self.state
    }

    pub fn set_state(&mut self, state: StateData) {
        self.state = state;
        // loaded registers are untrusted; run every calendar field through validation
        for i in 0..7 {
            let val = self.state.date_time[i];
            self.state.write_date_time(i, val);
        }
    }

    pub fn set_date_time(&mut self, year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) {
        self.state.set_date_time(year, month, day, hour, minute, second);
    }

    pub fn get_date_time(&self) -> (i32, i32, i32, i32, i32, i32) {
        self.state.get_date_time()
    }

    pub fn save(&self) -> RtcSave {
        RtcSave::from(self)
    }

    pub fn restore(&mut self, save: &RtcSave) {
        save.restore(self);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Register {
    StatusReg1,
    StatusReg2,
    DateTime,
    Time,
    Alarm1,
    Alarm2,
    ClockAdjust,
    FreeReg,
    MinuteCount,
    Fout1,
    Fout2,
    AlarmDate1,
    AlarmDate2,
}

impl Register {
    fn decode(family: u8, select: u8) -> Option<Register> {
        match (family, select) {
            (Rtc::FAMILY_STANDARD, 0x0) => Some(Register::StatusReg1),
            (Rtc::FAMILY_STANDARD, 0x4) => Some(Register::StatusReg2),
            (Rtc::FAMILY_STANDARD, 0x2) => Some(Register::DateTime),
            (Rtc::FAMILY_STANDARD, 0x6) => Some(Register::Time),
            (Rtc::FAMILY_STANDARD, 0x1) => Some(Register::Alarm1),
            (Rtc::FAMILY_STANDARD, 0x5) => Some(Register::Alarm2),
            (Rtc::FAMILY_STANDARD, 0x3) => Some(Register::ClockAdjust),
            (Rtc::FAMILY_STANDARD, 0x7) => Some(Register::FreeReg),
            (Rtc::FAMILY_EXTENDED, 0x0) => Some(Register::MinuteCount),
            (Rtc::FAMILY_EXTENDED, 0x4) => Some(Register::Fout1),
            (Rtc::FAMILY_EXTENDED, 0x2) => Some(Register::Fout2),
            (Rtc::FAMILY_EXTENDED, 0x1) => Some(Register::AlarmDate1),
            (Rtc::FAMILY_EXTENDED, 0x5) => Some(Register::AlarmDate2),
            _ => None,
        }
    }
}
