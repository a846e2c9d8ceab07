//! Provides [`Registry`], the ordered collection the surface keeps for each category of element.
//!
//! Elements are owned by the application and lent to a registry for the lifetime of the surface. Registration
//! happens once, during setup; afterwards a registry is only ever traversed, front to back, in the order elements
//! were registered.

use core::fmt;
use tinyvec::ArrayVec;

/// Number of elements each registry can hold unless a capacity is given explicitly.
pub const DEFAULT_CAPACITY: usize = 16;

/// Errors raised while registering elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// The registry already holds as many elements as it has room for.
    Full {
        /// The registry's fixed capacity.
        capacity: usize,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => {
                write!(f, "registry is full ({capacity} elements)")
            }
        }
    }
}

impl core::error::Error for RegistryError {}

/// An ordered, fixed-capacity collection of borrowed elements.
///
/// `E` is usually a trait object such as `dyn ControlElement`. Internally, slots are wrapped in [`Option`] because
/// [`tinyvec`] requires that items implement [`Default`]; every slot below `len()` is occupied.
pub struct Registry<'a, E: ?Sized, const N: usize = DEFAULT_CAPACITY> {
    elements: ArrayVec<[Option<&'a mut E>; N]>,
}

impl<'a, E: ?Sized, const N: usize> Default for Registry<'a, E, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E: ?Sized, const N: usize> Registry<'a, E, N> {
    /// Construct an empty [`Registry`].
    pub fn new() -> Self {
        Self {
            elements: ArrayVec::new(),
        }
    }

    /// Append an element. It will be visited after every element registered before it.
    pub fn register(&mut self, element: &'a mut E) -> Result<(), RegistryError> {
        match self.elements.try_push(Some(element)) {
            None => Ok(()),
            Some(_) => {
                warn!("Registry is full, rejecting element (capacity {})", N);
                Err(RegistryError::Full { capacity: N })
            }
        }
    }

    /// The number of registered elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an [`Iterator`] over the elements in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut E> + '_ {
        self.elements.iter_mut().filter_map(|slot| slot.as_deref_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Tag {
        fn tag(&self) -> u8;
        fn bump(&mut self);
    }

    struct Counter(u8);

    impl Tag for Counter {
        fn tag(&self) -> u8 {
            self.0
        }

        fn bump(&mut self) {
            self.0 += 10;
        }
    }

    #[test]
    fn preserves_registration_order() {
        let (mut a, mut b, mut c) = (Counter(1), Counter(2), Counter(3));
        let mut registry = Registry::<dyn Tag, 4>::new();
        registry.register(&mut b).unwrap();
        registry.register(&mut a).unwrap();
        registry.register(&mut c).unwrap();

        let order: Vec<u8> = registry.iter_mut().map(|e| e.tag()).collect();
        assert_eq!(vec![2, 1, 3], order, "Expected left but got right");
    }

    #[test]
    fn iter_mut_reaches_the_borrowed_elements() {
        let (mut a, mut b) = (Counter(1), Counter(2));
        {
            let mut registry = Registry::<dyn Tag, 2>::new();
            registry.register(&mut a).unwrap();
            registry.register(&mut b).unwrap();
            registry.iter_mut().for_each(|e| e.bump());
        }
        assert_eq!(11, a.tag(), "Expected left but got right");
        assert_eq!(12, b.tag(), "Expected left but got right");
    }

    #[test]
    fn rejects_rather_than_overflow() {
        let (mut a, mut b) = (Counter(1), Counter(2));
        let mut registry = Registry::<dyn Tag, 1>::new();
        assert_eq!(Ok(()), registry.register(&mut a), "Expected left but got right");
        assert_eq!(
            Err(RegistryError::Full { capacity: 1 }),
            registry.register(&mut b),
            "Expected left but got right"
        );
        assert_eq!(1, registry.len(), "Expected data length not to change");
    }

    #[test]
    fn empty_registry_visits_nothing() {
        let mut registry = Registry::<dyn Tag, 0>::new();
        assert!(registry.is_empty());
        assert_eq!(0, registry.iter_mut().count(), "Expected left but got right");
    }
}
