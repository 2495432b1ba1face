//! Texture object store.
//!
//! A fixed-capacity pool of texture records addressed by numeric ids.
//! Freed ids are kept in a free list and handed out again by later
//! generations. The id 0 always refers to the built-in default texture,
//! which can be neither deleted nor modified.

use alloc::vec::Vec;

use crate::error::Error;
use crate::render::tex::Texture;

/// A fixed-capacity store of textures.
#[derive(Clone, Debug)]
pub struct TexturePool<'a> {
    /// Slots indexed by id; `None` if the id is not in use.
    slots: Vec<Option<Texture<'a>>>,
    /// Unused ids, the next one to hand out last.
    free: Vec<u32>,
    /// The currently bound id.
    bound: u32,
    /// Sampled in place of textures without an image.
    white: Texture<'static>,
}

impl<'a> TexturePool<'a> {
    /// Creates a pool with room for `cap` textures, including the default
    /// texture. A capacity of zero is treated as one.
    pub fn new(cap: usize) -> Self {
        let cap = cap.clamp(1, u32::MAX as usize);
        let mut slots = Vec::with_capacity(cap);
        slots.push(Some(Texture::white()));
        slots.resize(cap, None);
        let free = (1..cap as u32).rev().collect();
        Self { slots, free, bound: 0, white: Texture::white() }
    }

    /// Returns the total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of ids that can still be generated.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Returns whether `id` has been generated and not deleted since.
    pub fn is_texture(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Returns the texture with the given id, if any.
    pub fn get(&self, id: u32) -> Option<&Texture<'a>> {
        self.slots.get(id as usize)?.as_ref()
    }

    /// Fills `ids` with unused texture ids.
    ///
    /// Either all of `ids` are generated, or none.
    ///
    /// # Errors
    /// [`Error::StackOverflow`] if fewer than `ids.len()` ids are free.
    pub fn generate(&mut self, ids: &mut [u32]) -> Result<(), Error> {
        if ids.len() > self.free.len() {
            return Err(Error::StackOverflow);
        }
        let start = self.free.len() - ids.len();
        for (id, free) in ids.iter_mut().zip(self.free.drain(start..).rev()) {
            self.slots[free as usize] = Some(Texture::empty());
            *id = free;
        }
        log::debug!("generated textures {ids:?}");
        Ok(())
    }

    /// Deletes the textures with the given ids, freeing owned image data.
    ///
    /// The id 0 and ids not in use are ignored. If the bound texture is
    /// deleted, the default texture becomes bound.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if any id is beyond the capacity of the pool.
    /// No texture is deleted in that case.
    pub fn delete(&mut self, ids: &[u32]) -> Result<(), Error> {
        if ids.iter().any(|&id| id as usize >= self.slots.len()) {
            return Err(Error::InvalidValue);
        }
        for &id in ids {
            if id == 0 || self.slots[id as usize].take().is_none() {
                continue;
            }
            self.free.push(id);
            if self.bound == id {
                self.bound = 0;
            }
        }
        log::debug!("deleted textures {ids:?}");
        Ok(())
    }

    /// Binds the texture `id`.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] if `id` is beyond the capacity of the pool.
    /// [`Error::InvalidOperation`] if `id` has not been generated.
    pub fn bind(&mut self, id: u32) -> Result<(), Error> {
        match self.slots.get(id as usize) {
            None => Err(Error::InvalidValue),
            Some(None) => Err(Error::InvalidOperation),
            Some(Some(_)) => {
                self.bound = id;
                Ok(())
            }
        }
    }

    /// Returns the id of the bound texture.
    pub fn bound(&self) -> u32 {
        self.bound
    }

    /// Returns the bound texture for modification.
    ///
    /// # Errors
    /// [`Error::InvalidOperation`] if the default texture is bound.
    pub fn bound_mut(&mut self) -> Result<&mut Texture<'a>, Error> {
        match self.bound {
            0 => Err(Error::InvalidOperation),
            id => self.slots[id as usize]
                .as_mut()
                .ok_or(Error::InvalidOperation),
        }
    }

    /// Returns the texture to sample from: the bound texture if it has an
    /// image, the default texture otherwise.
    pub fn current(&self) -> &Texture<'a> {
        match self.get(self.bound) {
            Some(t) if t.has_image() => t,
            _ => &self.white,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;

    use crate::util::pixfmt::TexFormat;

    use super::*;

    #[test]
    fn new_pool_has_default_only() {
        let pool = TexturePool::new(4);
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.available(), 3);
        assert!(pool.is_texture(0));
        assert!(!pool.is_texture(1));
        assert!(!pool.is_texture(4));
        assert_eq!(pool.bound(), 0);
        assert_eq!(pool.current(), &Texture::white());
    }

    #[test]
    fn generate_in_order() {
        let mut pool = TexturePool::new(4);
        let mut ids = [0; 2];
        pool.generate(&mut ids).unwrap();
        assert_eq!(ids, [1, 2]);
        assert!(pool.is_texture(1));
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn generate_is_all_or_nothing() {
        let mut pool = TexturePool::new(3);
        let mut ids = [0; 3];
        assert_eq!(pool.generate(&mut ids), Err(Error::StackOverflow));
        assert_eq!(ids, [0; 3]);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn deleted_ids_are_reused() {
        let mut pool = TexturePool::new(4);
        let mut ids = [0; 3];
        pool.generate(&mut ids).unwrap();
        pool.delete(&[2]).unwrap();
        assert!(!pool.is_texture(2));

        let mut id = [0];
        pool.generate(&mut id).unwrap();
        assert_eq!(id, [2]);
    }

    #[test]
    fn delete_validates_before_deleting() {
        let mut pool = TexturePool::new(4);
        let mut ids = [0; 2];
        pool.generate(&mut ids).unwrap();
        assert_eq!(pool.delete(&[1, 9]), Err(Error::InvalidValue));
        assert!(pool.is_texture(1));
    }

    #[test]
    fn default_texture_is_never_deleted() {
        let mut pool = TexturePool::new(2);
        pool.delete(&[0, 1]).unwrap();
        assert!(pool.is_texture(0));
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn deleting_bound_rebinds_default() {
        let mut pool = TexturePool::new(4);
        let mut id = [0];
        pool.generate(&mut id).unwrap();
        pool.bind(1).unwrap();
        assert_eq!(pool.bound(), 1);
        pool.delete(&[1]).unwrap();
        assert_eq!(pool.bound(), 0);
    }

    #[test]
    fn bind_errors() {
        let mut pool = TexturePool::new(4);
        assert_eq!(pool.bind(2), Err(Error::InvalidOperation));
        assert_eq!(pool.bind(4), Err(Error::InvalidValue));
        assert_eq!(pool.bind(0), Ok(()));
    }

    #[test]
    fn default_texture_is_read_only() {
        let mut pool = TexturePool::new(4);
        assert_eq!(pool.bound_mut().err(), Some(Error::InvalidOperation));
    }

    #[test]
    fn current_falls_back_to_default_without_image() {
        let data = [0x10, 0x20, 0x30, 0x40];
        let mut pool = TexturePool::new(4);
        let mut id = [0];
        pool.generate(&mut id).unwrap();
        pool.bind(1).unwrap();
        assert_eq!(pool.current(), &Texture::white());

        pool.bound_mut()
            .unwrap()
            .set_image(1, 1, TexFormat::Rgba8888, Cow::Borrowed(&data))
            .unwrap();
        assert_eq!(pool.current().data(), &data);
        assert!(!pool.current().is_owned());
    }
}
