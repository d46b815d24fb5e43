use serde::{Deserialize, Serialize};

use crate::io::rtc::{Rtc, StateData};

// Snapshot of a whole chip. The wire layout is this explicit field order,
// independent of the in-memory representation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RtcSave {
    pub io: u16,
    pub input: u8,
    pub input_bit: u32,
    pub input_pos: u32,
    pub output: [u8; 8],
    pub output_bit: u32,
    pub output_pos: u32,
    pub cur_cmd: u8,
    pub state: StateData,
    pub timer_error: i32,
    pub clock_count: u32,
}

impl From<&Rtc> for RtcSave {
    fn from(rtc: &Rtc) -> RtcSave {
        RtcSave {
            io: rtc.io,
            input: rtc.input,
            input_bit: rtc.input_bit,
            input_pos: rtc.input_pos,
            output: rtc.output,
            output_bit: rtc.output_bit,
            output_pos: rtc.output_pos,
            cur_cmd: rtc.cur_cmd,
            state: rtc.state,
            timer_error: rtc.timer_error,
            clock_count: rtc.clock_count,
        }
    }
}

impl RtcSave {
    pub fn restore(&self, rtc: &mut Rtc) {
        rtc.io = self.io;
        rtc.input = self.input;
        rtc.input_bit = self.input_bit;
        rtc.input_pos = self.input_pos;
        rtc.output = self.output;
        rtc.output_bit = self.output_bit;
        rtc.output_pos = self.output_pos;
        rtc.cur_cmd = self.cur_cmd;
        rtc.timer_error = self.timer_error;
        rtc.clock_count = self.clock_count;

        // set_state re-validates every calendar field, persisted bytes
        // get no other sanity check
        rtc.set_state(self.state);
    }
}

pub fn save(rtc: &Rtc) -> bincode::Result<Vec<u8>> {
    bincode::serialize(&RtcSave::from(rtc))
}

pub fn load(rtc: &mut Rtc, bytes: &[u8]) -> bincode::Result<()> {
    let save: RtcSave = bincode::deserialize(bytes)?;
    save.restore(rtc);
    Ok(())
}
