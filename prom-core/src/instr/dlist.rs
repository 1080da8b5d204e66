use log::{debug, warn};

use crate::cpu::{ExecError, PromCpu};
use crate::dlist::PrimitiveType;
use crate::mem::MemoryDomain;
use crate::regs::RegisterValue;

///
/// Display-list family. These forward to the DisplayListManager, reading
/// length-prefixed names and float triples out of the code stream. The
/// manager's protocol violations (nested DLSTART, stray DLEND, duplicate
/// names, malformed colors) are API misuse and propagate.
///
pub trait PromDisplay {
    fn dlstart(&mut self) -> Result<(), ExecError>;
    fn dlprimitive(&mut self) -> Result<(), ExecError>;
    fn dlcolor(&mut self) -> Result<(), ExecError>;
    fn dlvertex(&mut self) -> Result<(), ExecError>;
    fn dlend(&mut self) -> Result<(), ExecError>;
    fn dlcall(&mut self) -> Result<(), ExecError>;
    fn storemodel(&mut self) -> Result<(), ExecError>;
    fn loadmodel(&mut self) -> Result<(), ExecError>;
}

impl PromDisplay for PromCpu {
    fn dlstart(&mut self) -> Result<(), ExecError> {
        let Some(name) = self.fetch_name() else { return Ok(()) };
        self.dlist.start(&name)?;
        Ok(())
    }

    fn dlprimitive(&mut self) -> Result<(), ExecError> {
        let Some(raw) = self.fetch_byte() else { return Ok(()) };
        let Some(primitive) = PrimitiveType::from_u8(raw) else {
            warn!("DLPRIMITIVE: unknown primitive type {}; skipping", raw);
            return Ok(());
        };
        self.dlist.add_primitive(primitive)?;
        Ok(())
    }

    fn dlcolor(&mut self) -> Result<(), ExecError> {
        let Some(hex) = self.fetch_name() else { return Ok(()) };
        self.dlist.add_color(&hex)?;
        Ok(())
    }

    fn dlvertex(&mut self) -> Result<(), ExecError> {
        let Some(x) = self.fetch_float() else { return Ok(()) };
        let Some(y) = self.fetch_float() else { return Ok(()) };
        let Some(z) = self.fetch_float() else { return Ok(()) };
        self.dlist.add_vertex(x, y, z)?;
        Ok(())
    }

    fn dlend(&mut self) -> Result<(), ExecError> {
        self.dlist.end()?;
        Ok(())
    }

    ///
    /// Invokes a sealed list: hands it to the renderer and appends its
    /// serialized form to the Dpl domain at the running cursor. Earlier
    /// lists stay in place; the cursor only moves forward.
    ///
    fn dlcall(&mut self) -> Result<(), ExecError> {
        let Some(name) = self.fetch_name() else { return Ok(()) };
        let Some(x) = self.fetch_float() else { return Ok(()) };
        let Some(y) = self.fetch_float() else { return Ok(()) };
        let Some(z) = self.fetch_float() else { return Ok(()) };

        self.dlist.call(&name, x, y, z)?;
        let written =
            self.dlist.store_to_domain(&name, &mut self.mem, MemoryDomain::Dpl, self.dpl_cursor)?;
        self.dpl_cursor += written;
        Ok(())
    }

    /// Stores a display-list reference in a register, tagging it Model.
    fn storemodel(&mut self) -> Result<(), ExecError> {
        let Some(name) = self.fetch_name() else { return Ok(()) };
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        debug!("STOREMODEL: register {} <- '{}'", reg, name);
        self.reg_write(reg, RegisterValue::Model(name));
        Ok(())
    }

    ///
    /// Stages the model named by a Model-tagged register into the Video
    /// domain in the 3D mesh format, where the external rasterizer picks
    /// it up. A register that does not hold a model is a guest mistake,
    /// logged and skipped.
    ///
    fn loadmodel(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let name = match self.regs.get(reg).and_then(|r| r.as_model()) {
            Some(name) => name.to_string(),
            None => {
                warn!("LOADMODEL: register {} does not hold a model reference", reg);
                return Ok(());
            }
        };

        let data = self.dlist.serialize_as_3d(&name)?;
        for (i, byte) in data.iter().enumerate() {
            self.mem.write(MemoryDomain::Video, i, *byte)?;
        }
        debug!("LOADMODEL: staged '{}' into Video ({} bytes)", name, data.len());
        Ok(())
    }
}
