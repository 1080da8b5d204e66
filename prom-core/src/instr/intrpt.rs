use log::{debug, warn};

use crate::cpu::{ExecError, PromCpu};

///
/// Interrupt family. The core has no interrupt controller; devices such as
/// the controller pad raise interrupts through the host instead. A guest
/// issuing INT is told so and keeps running.
///
pub trait PromInterrupt {
    fn int_request(&mut self) -> Result<(), ExecError>;
    fn iret(&mut self) -> Result<(), ExecError>;
    fn ei(&mut self) -> Result<(), ExecError>;
    fn di(&mut self) -> Result<(), ExecError>;
}

impl PromInterrupt for PromCpu {
    fn int_request(&mut self) -> Result<(), ExecError> {
        let Some(number) = self.fetch_byte() else { return Ok(()) };
        warn!("INT {}: interrupts are not implemented; continuing", number);
        Ok(())
    }

    fn iret(&mut self) -> Result<(), ExecError> {
        warn!("IRET outside an interrupt handler; continuing");
        Ok(())
    }

    fn ei(&mut self) -> Result<(), ExecError> {
        debug!("interrupts enabled");
        self.ints_enabled = true;
        Ok(())
    }

    fn di(&mut self) -> Result<(), ExecError> {
        debug!("interrupts disabled");
        self.ints_enabled = false;
        Ok(())
    }
}
