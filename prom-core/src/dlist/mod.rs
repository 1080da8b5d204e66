use std::collections::HashMap;

use crossbeam_channel::Sender;
use log::{debug, trace, warn};
use thiserror::Error;

use crate::consts::{DISPLAY_LIST_3D_HEADER, DISPLAY_LIST_MAGIC, MODEL_NAME_MAX};
use crate::mem::{MemoryDomain, MemoryError, PromMemory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PrimitiveType {
    Triangle = 1,
    Square = 2,
    Polygon = 3,
}

impl PrimitiveType {
    pub fn from_u8(value: u8) -> Option<PrimitiveType> {
        match value {
            1 => Some(PrimitiveType::Triangle),
            2 => Some(PrimitiveType::Square),
            3 => Some(PrimitiveType::Polygon),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    ///
    /// Parses a 6-digit `RRGGBB` hex string, the color format carried by
    /// DLCOLOR. Anything else is a protocol violation.
    ///
    pub fn from_hex(hex: &str) -> Result<Rgb, DisplayListError> {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DisplayListError::InvalidColor { color: hex.to_string() });
        }
        let value = u32::from_str_radix(hex, 16)
            .map_err(|_| DisplayListError::InvalidColor { color: hex.to_string() })?;
        Ok(Rgb {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        })
    }
}

///
/// One recorded drawing command. The wire tag bytes in `serialize` follow
/// this declaration order: primitive 0, color 1, vertex 2.
///
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    Primitive(PrimitiveType),
    Color(Rgb),
    Vertex { x: f32, y: f32, z: f32 },
}

impl DisplayCommand {
    fn wire_tag(&self) -> u8 {
        match self {
            DisplayCommand::Primitive(_) => 0,
            DisplayCommand::Color(_) => 1,
            DisplayCommand::Vertex { .. } => 2,
        }
    }
}

/// A named, ordered recording of drawing commands.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub name: String,
    pub commands: Vec<DisplayCommand>,
}

impl DisplayList {
    fn new(name: &str) -> DisplayList {
        DisplayList { name: name.to_string(), commands: Vec::new() }
    }
}

///
/// Snapshot handed to the external renderer when a sealed list is called.
///
#[derive(Debug, Clone)]
pub struct RenderCall {
    pub list: DisplayList,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Error, PartialEq)]
pub enum DisplayListError {
    #[error("finish the current display list with DLEND before starting a new one")]
    ListInProgress,

    #[error("no display list is being built; DLSTART must come first")]
    NoListInProgress,

    #[error("a display list named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("display list '{name}' not found")]
    NotFound { name: String },

    #[error("invalid color hex '{color}'")]
    InvalidColor { color: String },

    #[error("model name '{name}' exceeds {MODEL_NAME_MAX} characters")]
    NameTooLong { name: String },

    #[error("serialized display list is malformed at byte {offset}")]
    Malformed { offset: usize },

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

///
/// Records display lists and serializes them for the renderer. At most one
/// list may be under construction at a time; the protocol violations here
/// are host-level failures and propagate, unlike guest arithmetic mistakes.
///
pub struct DisplayListManager {
    lists: HashMap<String, DisplayList>,
    current: Option<DisplayList>,
    renderer: Option<Sender<RenderCall>>,
}

impl DisplayListManager {
    pub fn new() -> DisplayListManager {
        DisplayListManager { lists: HashMap::new(), current: None, renderer: None }
    }

    ///
    /// Connects the channel an external renderer drains. Without one,
    /// `call` only logs the invocation.
    ///
    pub fn attach_renderer(&mut self, tx: Sender<RenderCall>) {
        self.renderer = Some(tx);
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(|name| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&DisplayList> {
        self.lists.get(name)
    }

    pub fn start(&mut self, name: &str) -> Result<(), DisplayListError> {
        if self.current.is_some() {
            return Err(DisplayListError::ListInProgress);
        }
        if self.lists.contains_key(name) {
            return Err(DisplayListError::DuplicateName { name: name.to_string() });
        }
        if name.len() > MODEL_NAME_MAX {
            return Err(DisplayListError::NameTooLong { name: name.to_string() });
        }
        trace!("building display list '{}'", name);
        self.current = Some(DisplayList::new(name));
        Ok(())
    }

    pub fn add_primitive(&mut self, primitive: PrimitiveType) -> Result<(), DisplayListError> {
        let list = self.current.as_mut().ok_or(DisplayListError::NoListInProgress)?;
        list.commands.push(DisplayCommand::Primitive(primitive));
        Ok(())
    }

    pub fn add_color(&mut self, hex: &str) -> Result<(), DisplayListError> {
        let color = Rgb::from_hex(hex)?;
        let list = self.current.as_mut().ok_or(DisplayListError::NoListInProgress)?;
        list.commands.push(DisplayCommand::Color(color));
        Ok(())
    }

    pub fn add_vertex(&mut self, x: f32, y: f32, z: f32) -> Result<(), DisplayListError> {
        let list = self.current.as_mut().ok_or(DisplayListError::NoListInProgress)?;
        list.commands.push(DisplayCommand::Vertex { x, y, z });
        Ok(())
    }

    /// Seals the list under construction into the map.
    pub fn end(&mut self) -> Result<(), DisplayListError> {
        let list = self.current.take().ok_or(DisplayListError::NoListInProgress)?;
        trace!("sealed display list '{}' ({} commands)", list.name, list.commands.len());
        self.lists.insert(list.name.clone(), list);
        Ok(())
    }

    ///
    /// Looks up a sealed list and hands a snapshot to the renderer at the
    /// given position.
    ///
    pub fn call(&self, name: &str, x: f32, y: f32, z: f32) -> Result<(), DisplayListError> {
        let list = self
            .lists
            .get(name)
            .ok_or_else(|| DisplayListError::NotFound { name: name.to_string() })?;
        debug!("calling display list '{}' at ({}, {}, {})", name, x, y, z);
        match &self.renderer {
            Some(tx) => {
                if tx.send(RenderCall { list: list.clone(), x, y, z }).is_err() {
                    warn!("renderer channel disconnected; dropping call to '{}'", name);
                }
            }
            None => {
                for cmd in &list.commands {
                    trace!("  {:?}", cmd);
                }
            }
        }
        Ok(())
    }

    ///
    /// Command-stream serialization:
    /// `[0xD2][len][name][vertex count][color count][primitive count]`
    /// followed by one tagged record per command in recording order
    /// (primitive = 1 type byte, color = 3 RGB bytes, vertex = 3 floats).
    ///
    pub fn serialize(&self, name: &str) -> Result<Vec<u8>, DisplayListError> {
        let list = self
            .lists
            .get(name)
            .ok_or_else(|| DisplayListError::NotFound { name: name.to_string() })?;

        let mut bytes = Vec::new();
        bytes.push(DISPLAY_LIST_MAGIC);
        bytes.push(list.name.len() as u8);
        bytes.extend_from_slice(list.name.as_bytes());

        let count_of = |tag: u8| list.commands.iter().filter(|c| c.wire_tag() == tag).count() as u8;
        bytes.push(count_of(2));
        bytes.push(count_of(1));
        bytes.push(count_of(0));

        for cmd in &list.commands {
            bytes.push(cmd.wire_tag());
            match cmd {
                DisplayCommand::Primitive(p) => bytes.push(*p as u8),
                DisplayCommand::Color(c) => bytes.extend_from_slice(&[c.r, c.g, c.b]),
                DisplayCommand::Vertex { x, y, z } => {
                    bytes.extend_from_slice(&x.to_le_bytes());
                    bytes.extend_from_slice(&y.to_le_bytes());
                    bytes.extend_from_slice(&z.to_le_bytes());
                }
            }
        }

        trace!("serialized '{}' into {} bytes", name, bytes.len());
        Ok(bytes)
    }

    ///
    /// Decodes a `serialize` byte stream back into a display list. The
    /// renderer-side counterpart of the wire contract; also what keeps the
    /// round-trip honest in tests.
    ///
    pub fn deserialize(bytes: &[u8]) -> Result<DisplayList, DisplayListError> {
        fn take<'a>(
            bytes: &'a [u8],
            offset: &mut usize,
            n: usize,
        ) -> Result<&'a [u8], DisplayListError> {
            let slice = bytes
                .get(*offset..*offset + n)
                .ok_or(DisplayListError::Malformed { offset: *offset })?;
            *offset += n;
            Ok(slice)
        }

        let mut offset = 0usize;
        if take(bytes, &mut offset, 1)?[0] != DISPLAY_LIST_MAGIC {
            return Err(DisplayListError::Malformed { offset: 0 });
        }
        let name_len = take(bytes, &mut offset, 1)?[0] as usize;
        let name = String::from_utf8(take(bytes, &mut offset, name_len)?.to_vec())
            .map_err(|_| DisplayListError::Malformed { offset })?;
        // Counts are advisory; the tagged stream is self-describing.
        take(bytes, &mut offset, 3)?;

        let mut list = DisplayList::new(&name);
        while offset < bytes.len() {
            let tag = take(bytes, &mut offset, 1)?[0];
            let cmd = match tag {
                0 => {
                    let value = take(bytes, &mut offset, 1)?[0];
                    let primitive = PrimitiveType::from_u8(value)
                        .ok_or(DisplayListError::Malformed { offset })?;
                    DisplayCommand::Primitive(primitive)
                }
                1 => {
                    let rgb = take(bytes, &mut offset, 3)?;
                    DisplayCommand::Color(Rgb { r: rgb[0], g: rgb[1], b: rgb[2] })
                }
                2 => {
                    let mut coords = [0f32; 3];
                    for coord in coords.iter_mut() {
                        let raw = take(bytes, &mut offset, 4)?;
                        *coord = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
                    }
                    DisplayCommand::Vertex { x: coords[0], y: coords[1], z: coords[2] }
                }
                _ => return Err(DisplayListError::Malformed { offset: offset - 1 }),
            };
            list.commands.push(cmd);
        }
        Ok(list)
    }

    ///
    /// Mesh-block serialization for the 3D rasterizer: a 16-byte header
    /// `[primitive][vertex count i32][color count i32][index count i32][pad]`
    /// then 12 bytes per vertex and 4 bytes per color (alpha forced to 255).
    /// No indices are emitted yet, the count is always zero.
    ///
    pub fn serialize_as_3d(&self, name: &str) -> Result<Vec<u8>, DisplayListError> {
        let list = self
            .lists
            .get(name)
            .ok_or_else(|| DisplayListError::NotFound { name: name.to_string() })?;

        // Primitive type of the first primitive command; Triangle when the
        // list never set one.
        let primitive = list
            .commands
            .iter()
            .find_map(|cmd| match cmd {
                DisplayCommand::Primitive(p) => Some(*p as u8),
                _ => None,
            })
            .unwrap_or(PrimitiveType::Triangle as u8);

        let vertex_count = list
            .commands
            .iter()
            .filter(|c| matches!(c, DisplayCommand::Vertex { .. }))
            .count() as i32;
        let color_count = list
            .commands
            .iter()
            .filter(|c| matches!(c, DisplayCommand::Color(_)))
            .count() as i32;

        let mut bytes = Vec::new();
        bytes.push(primitive);
        bytes.extend_from_slice(&vertex_count.to_le_bytes());
        bytes.extend_from_slice(&color_count.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        while bytes.len() < DISPLAY_LIST_3D_HEADER {
            bytes.push(0);
        }

        for cmd in &list.commands {
            if let DisplayCommand::Vertex { x, y, z } = cmd {
                bytes.extend_from_slice(&x.to_le_bytes());
                bytes.extend_from_slice(&y.to_le_bytes());
                bytes.extend_from_slice(&z.to_le_bytes());
            }
        }
        for cmd in &list.commands {
            if let DisplayCommand::Color(c) = cmd {
                bytes.extend_from_slice(&[c.r, c.g, c.b, 255]);
            }
        }

        Ok(bytes)
    }

    ///
    /// Writes the command-stream serialization into a memory domain at
    /// `start` and returns the byte count. Earlier data is left in place;
    /// the CPU owns the next-free-address cursor.
    ///
    pub fn store_to_domain(
        &self,
        name: &str,
        mem: &mut PromMemory,
        domain: MemoryDomain,
        start: usize,
    ) -> Result<usize, DisplayListError> {
        let data = self.serialize(name)?;
        for (i, byte) in data.iter().enumerate() {
            mem.write(domain, start + i, *byte)?;
        }
        debug!(
            "stored display list '{}' in {:?} at {:#010x}..{:#010x}",
            name,
            domain,
            start,
            start + data.len()
        );
        Ok(data.len())
    }
}

impl Default for DisplayListManager {
    fn default() -> Self {
        DisplayListManager::new()
    }
}
