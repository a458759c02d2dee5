//! Per-cell records stored in the grid layers
//!
//! Records are fixed-width and serialized field by field in little-endian
//! order, so the on-wire layout never depends on in-memory struct layout.

use crate::io::configuration::{
    ANIMATION_BASE_PERIOD_MS, ANIMATION_PERIOD_STEP_MS, ANIMATION_SPEED_CLASSES, DESCRIPTION_LEN,
    MAX_ANIMATION_FRAMES,
};
use crate::io::error::{Result, format_error};

/// Terrain tile reference inside an external tile image package
///
/// Only meaningful on cells whose ground flag is set; void cells always
/// hold the default value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BaseTile {
    /// Image package holding the tile
    pub file_index: u8,
    /// Tile index inside the package
    pub tile_index: u16,
}

impl BaseTile {
    /// Create a tile reference
    pub const fn new(file_index: u8, tile_index: u16) -> Self {
        Self {
            file_index,
            tile_index,
        }
    }

    /// Pack into a 32-bit payload token
    pub const fn to_token(self) -> u32 {
        ((self.file_index as u32) << 16) | self.tile_index as u32
    }

    /// Unpack a 32-bit payload token
    ///
    /// # Errors
    ///
    /// Returns a format error if the reserved high byte is set
    pub fn from_token(token: u32) -> Result<Self> {
        if token >> 24 != 0 {
            return Err(format_error(
                "base tile token",
                &format!("reserved bits set in {token:#010x}"),
            ));
        }
        Ok(Self {
            file_index: (token >> 16) as u8,
            tile_index: token as u16,
        })
    }
}

/// Capability markers held in the first byte of a cell descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CellFlags(u8);

impl CellFlags {
    /// First decoration tile present
    pub const OBJECT1: Self = Self(0x01);
    /// Second decoration tile present
    pub const OBJECT2: Self = Self(0x02);
    /// Cell is part of a door
    pub const DOOR: Self = Self(0x04);
    /// Cell emits light
    pub const LIGHT: Self = Self(0x08);
    /// Cell triggers an event
    pub const EVENT: Self = Self(0x10);
    /// Every bit with a defined meaning
    pub const KNOWN: Self = Self(0x1F);

    /// No capability set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from raw bits, keeping unknown bits
    pub const fn from_bits_retain(bits: u8) -> Self {
        Self(bits)
    }

    /// Build from raw bits, dropping unknown bits
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::KNOWN.0)
    }

    /// Raw bit value
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether all bits of `other` are set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no bit is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether bits outside [`Self::KNOWN`] are set
    pub const fn has_unknown(self) -> bool {
        self.0 & !Self::KNOWN.0 != 0
    }

    /// Set or clear the bits of `other`
    pub const fn set(&mut self, other: Self, value: bool) {
        if value {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }

    /// Union of two flag sets
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for CellFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Animation control byte of a decoration tile
///
/// Bit 7 marks the tile animated, bits 4..6 select the speed class and
/// bits 0..3 hold the frame count minus one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Animation(pub u8);

impl Animation {
    const ANIMATED: u8 = 0x80;
    const SPEED_MASK: u8 = ANIMATION_SPEED_CLASSES - 1;
    const FRAME_MASK: u8 = MAX_ANIMATION_FRAMES - 1;

    /// Build an animation byte, clamping inputs to their bit widths
    pub const fn new(speed_class: u8, frame_count: u8) -> Self {
        if frame_count <= 1 {
            return Self(0);
        }
        let frames = if frame_count > MAX_ANIMATION_FRAMES {
            Self::FRAME_MASK
        } else {
            frame_count - 1
        };
        Self(Self::ANIMATED | ((speed_class & Self::SPEED_MASK) << 4) | frames)
    }

    /// Whether the tile cycles through frames
    pub const fn is_animated(self) -> bool {
        self.0 & Self::ANIMATED != 0
    }

    /// Speed class in `0..8`
    pub const fn speed_class(self) -> u8 {
        (self.0 >> 4) & Self::SPEED_MASK
    }

    /// Number of frames, 1 for static tiles
    pub const fn frame_count(self) -> u8 {
        if self.is_animated() {
            (self.0 & Self::FRAME_MASK) + 1
        } else {
            1
        }
    }

    /// Duration of one frame for this speed class in milliseconds
    pub const fn period_ms(self) -> u64 {
        ANIMATION_BASE_PERIOD_MS + self.speed_class() as u64 * ANIMATION_PERIOD_STEP_MS
    }
}

/// Door state byte: bit 7 open, bits 0..6 image offset of the open door
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DoorOffset(pub u8);

impl DoorOffset {
    const OPEN: u8 = 0x80;

    /// Whether the door is open
    pub const fn is_open(self) -> bool {
        self.0 & Self::OPEN != 0
    }

    /// Image offset applied while the door is open
    pub const fn image_offset(self) -> u8 {
        self.0 & !Self::OPEN
    }

    /// Same offset with the open bit set or cleared
    #[must_use]
    pub const fn with_open(self, open: bool) -> Self {
        if open {
            Self(self.0 | Self::OPEN)
        } else {
            Self(self.0 & !Self::OPEN)
        }
    }
}

/// Per-cell decoration, door, light and event record
///
/// The flag byte is the sole authority on which fields are meaningful.
/// Values held by the grid are always [normalized](Self::normalized).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CellDescriptor {
    /// Capability markers
    pub flags: CellFlags,
    /// Animation of object 1
    pub object1_anim: Animation,
    /// Animation of object 2
    pub object2_anim: Animation,
    /// Image packages: low byte object 1, high byte object 2
    pub file_indices: u16,
    /// Tile index of object 1
    pub object1: u16,
    /// Tile index of object 2
    pub object2: u16,
    /// Door group identifier shared by every cell of one door
    pub door_group: u16,
    /// Door open state and image offset
    pub door_offset: DoorOffset,
    /// Light intensity (low byte) and event trigger id (high byte)
    pub light_event: u16,
}

impl CellDescriptor {
    /// Encoded record size in bytes
    pub const ENCODED_LEN: usize = 14;

    /// Whether this descriptor carries nothing
    pub const fn is_default(&self) -> bool {
        self.flags.is_empty()
    }

    /// Copy with every field not covered by a flag bit zeroed
    #[must_use]
    pub const fn normalized(mut self) -> Self {
        let flags = self.flags;
        let mut files = 0;
        if flags.contains(CellFlags::OBJECT1) {
            files |= self.file_indices & 0x00FF;
        } else {
            self.object1 = 0;
            self.object1_anim = Animation(0);
        }
        if flags.contains(CellFlags::OBJECT2) {
            files |= self.file_indices & 0xFF00;
        } else {
            self.object2 = 0;
            self.object2_anim = Animation(0);
        }
        self.file_indices = files;
        if !flags.contains(CellFlags::DOOR) {
            self.door_group = 0;
            self.door_offset = DoorOffset(0);
        }
        let mut light_event = 0;
        if flags.contains(CellFlags::LIGHT) {
            light_event |= self.light_event & 0x00FF;
        }
        if flags.contains(CellFlags::EVENT) {
            light_event |= self.light_event & 0xFF00;
        }
        self.light_event = light_event;
        self
    }

    /// Decoration tile in slot 0 or 1 as (file index, tile index, animation)
    pub const fn object(&self, slot: usize) -> Option<(u8, u16, Animation)> {
        match slot {
            0 if self.flags.contains(CellFlags::OBJECT1) => Some((
                self.file_indices as u8,
                self.object1,
                self.object1_anim,
            )),
            1 if self.flags.contains(CellFlags::OBJECT2) => Some((
                (self.file_indices >> 8) as u8,
                self.object2,
                self.object2_anim,
            )),
            _ => None,
        }
    }

    /// Place a decoration tile in slot 0 or 1
    ///
    /// Slots other than 0 and 1 are ignored.
    pub const fn set_object(&mut self, slot: usize, file_index: u8, tile_index: u16, anim: Animation) {
        match slot {
            0 => {
                self.flags.set(CellFlags::OBJECT1, true);
                self.file_indices = (self.file_indices & 0xFF00) | file_index as u16;
                self.object1 = tile_index;
                self.object1_anim = anim;
            }
            1 => {
                self.flags.set(CellFlags::OBJECT2, true);
                self.file_indices = (self.file_indices & 0x00FF) | ((file_index as u16) << 8);
                self.object2 = tile_index;
                self.object2_anim = anim;
            }
            _ => {}
        }
    }

    /// Remove the decoration tile in slot 0 or 1
    pub const fn clear_object(&mut self, slot: usize) {
        match slot {
            0 => self.flags.set(CellFlags::OBJECT1, false),
            1 => self.flags.set(CellFlags::OBJECT2, false),
            _ => {}
        }
        *self = self.normalized();
    }

    /// Door group and state when this cell belongs to a door
    pub const fn door(&self) -> Option<(u16, DoorOffset)> {
        if self.flags.contains(CellFlags::DOOR) {
            Some((self.door_group, self.door_offset))
        } else {
            None
        }
    }

    /// Make this cell part of a door group
    pub const fn set_door(&mut self, group: u16, offset: DoorOffset) {
        self.flags.set(CellFlags::DOOR, true);
        self.door_group = group;
        self.door_offset = offset;
    }

    /// Light intensity when the cell emits light
    pub const fn light(&self) -> Option<u8> {
        if self.flags.contains(CellFlags::LIGHT) {
            Some(self.light_event as u8)
        } else {
            None
        }
    }

    /// Set the light intensity
    pub const fn set_light(&mut self, intensity: u8) {
        self.flags.set(CellFlags::LIGHT, true);
        self.light_event = (self.light_event & 0xFF00) | intensity as u16;
    }

    /// Event trigger id when the cell triggers an event
    pub const fn event(&self) -> Option<u8> {
        if self.flags.contains(CellFlags::EVENT) {
            Some((self.light_event >> 8) as u8)
        } else {
            None
        }
    }

    /// Set the event trigger id
    pub const fn set_event(&mut self, event: u8) {
        self.flags.set(CellFlags::EVENT, true);
        self.light_event = (self.light_event & 0x00FF) | ((event as u16) << 8);
    }

    /// Append the 14-byte little-endian record
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.flags.bits());
        out.push(self.object1_anim.0);
        out.push(self.object2_anim.0);
        out.extend_from_slice(&self.file_indices.to_le_bytes());
        out.extend_from_slice(&self.object1.to_le_bytes());
        out.extend_from_slice(&self.object2.to_le_bytes());
        out.extend_from_slice(&self.door_group.to_le_bytes());
        out.push(self.door_offset.0);
        out.extend_from_slice(&self.light_event.to_le_bytes());
    }

    /// Read a 14-byte record exactly as stored, without normalizing
    ///
    /// # Errors
    ///
    /// Returns a format error if fewer than 14 bytes are given
    pub fn read_from(bytes: &[u8]) -> Result<Self> {
        let record: &[u8; Self::ENCODED_LEN] = bytes
            .get(..Self::ENCODED_LEN)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| {
                format_error(
                    "cell record",
                    &format!("expected {} bytes, got {}", Self::ENCODED_LEN, bytes.len()),
                )
            })?;
        let [
            flags,
            anim1,
            anim2,
            f0,
            f1,
            o10,
            o11,
            o20,
            o21,
            d0,
            d1,
            door_offset,
            l0,
            l1,
        ] = *record;
        Ok(Self {
            flags: CellFlags::from_bits_retain(flags),
            object1_anim: Animation(anim1),
            object2_anim: Animation(anim2),
            file_indices: u16::from_le_bytes([f0, f1]),
            object1: u16::from_le_bytes([o10, o11]),
            object2: u16::from_le_bytes([o20, o21]),
            door_group: u16::from_le_bytes([d0, d1]),
            door_offset: DoorOffset(door_offset),
            light_event: u16::from_le_bytes([l0, l1]),
        })
    }
}

/// Descriptive map metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapHeader {
    /// Description field exactly as stored, NUL padded
    ///
    /// Legacy maps use several 8-bit encodings, so the bytes are kept as
    /// they are and only decoded for display.
    pub description: [u8; DESCRIPTION_LEN],
    /// Attribute bits carried through unchanged
    pub attributes: u16,
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// Event script package index
    pub event_file_index: u8,
    /// Fog color index
    pub fog_color: u8,
}

impl MapHeader {
    /// Header for a map of the given size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Store text as the description, truncated on a char boundary
    pub fn set_description(&mut self, text: &str) {
        let mut end = text.len().min(DESCRIPTION_LEN);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        self.description = [0; DESCRIPTION_LEN];
        if let (Some(dst), Some(src)) = (
            self.description.get_mut(..end),
            text.as_bytes().get(..end),
        ) {
            dst.copy_from_slice(src);
        }
    }

    /// Description up to the first NUL, lossily decoded for display
    pub fn description_text(&self) -> String {
        let end = self
            .description
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(DESCRIPTION_LEN);
        String::from_utf8_lossy(self.description.get(..end).unwrap_or_default()).into_owned()
    }
}
