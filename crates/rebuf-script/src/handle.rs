//! Shared buffer handles and the type tag.
//!
//! A script buffer keeps its current element type in the low five bits of
//! the engine's user tag. The remaining bits belong to the host.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use rebuf_core::ElemType;
use rebuf_engine::Buffer;

/// Bits of the user tag holding the current type code.
pub const TYPE_TAG_MASK: u32 = ElemType::CODE_MASK as u32;

/// A reference-counted handle to a buffer owned by the host.
///
/// Clones share the buffer. The buffer is released when the last handle is
/// dropped.
#[derive(Clone)]
pub struct BufferRef(Rc<RefCell<Buffer>>);

impl BufferRef {
    /// Hand a buffer over to the host.
    pub fn new(buffer: Buffer) -> Self {
        Self(Rc::new(RefCell::new(buffer)))
    }

    /// Borrow the buffer.
    ///
    /// # Panics
    ///
    /// If the buffer is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, Buffer> {
        self.0.borrow()
    }

    /// Borrow the buffer mutably.
    ///
    /// # Panics
    ///
    /// If the buffer is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, Buffer> {
        self.0.borrow_mut()
    }

    /// Whether two handles share a buffer.
    pub fn ptr_eq(&self, other: &BufferRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles to this buffer.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Take the buffer back if this is the only handle.
    pub fn try_unwrap(self) -> Result<Buffer, BufferRef> {
        Rc::try_unwrap(self.0)
            .map(RefCell::into_inner)
            .map_err(BufferRef)
    }
}

impl fmt::Debug for BufferRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(buf) => f
                .debug_struct("BufferRef")
                .field("size", &buf.size())
                .field("type", &type_code(&buf))
                .finish(),
            Err(_) => f.write_str("BufferRef(<borrowed>)"),
        }
    }
}

/// The raw type code stored in `buf`'s tag.
pub fn type_code(buf: &Buffer) -> u8 {
    (buf.user() & TYPE_TAG_MASK) as u8
}

/// Store `ty` as `buf`'s current type, leaving the host bits untouched.
pub fn set_type(buf: &mut Buffer, ty: ElemType) {
    let user = buf.user() & !TYPE_TAG_MASK;
    buf.set_user(user | u32::from(ty.code()));
}

/// Decode the type stored in `buf`'s tag.
///
/// Falls back to `unsigned char` for a tag that does not decode, which only
/// happens if host code wrote the tag bits directly.
pub fn current_type(buf: &Buffer) -> ElemType {
    ElemType::from_code(i64::from(type_code(buf))).unwrap_or(ElemType::UNSIGNED_CHAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebuf_core::Kind;

    #[test]
    fn tag_preserves_host_bits() {
        let mut buf = Buffer::allocate(4).unwrap();
        buf.set_user(0xabcd_0000);
        set_type(&mut buf, ElemType::signed(Kind::Int));
        assert_eq!(buf.user(), 0xabcd_0012);
        set_type(&mut buf, ElemType::unsigned(Kind::Bits8));
        assert_eq!(buf.user(), 0xabcd_0007);
        assert_eq!(current_type(&buf), ElemType::unsigned(Kind::Bits8));
    }

    #[test]
    fn garbage_tag_reads_as_unsigned_char() {
        let mut buf = Buffer::allocate(4).unwrap();
        buf.set_user(0x1f);
        assert_eq!(type_code(&buf), 0x1f);
        assert_eq!(current_type(&buf), ElemType::UNSIGNED_CHAR);
    }

    #[test]
    fn last_handle_releases() {
        let a = BufferRef::new(Buffer::allocate(4).unwrap());
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.handle_count(), 2);
        let a = a.try_unwrap().unwrap_err();
        drop(b);
        let buf = a.try_unwrap().unwrap();
        assert_eq!(buf.size(), 4);
    }
}
