/// Elements that carry a SId `id`, and can therefore be looked up in a [`SedListOf`].
pub trait SedIdentified {
    fn sed_id(&self) -> &str;
}

/// Lookup helpers for `listOf*` containers, which are plain vectors in this crate.
///
/// Index-based access uses the usual `Vec` API (`get`, `len`), plus [`SedListOf::remove_at`]
/// which does not panic on an out-of-range index.
pub trait SedListOf<T: SedIdentified> {
    /// The first item with the given `id`.
    fn get_by_id(&self, id: &str) -> Option<&T>;

    fn get_by_id_mut(&mut self, id: &str) -> Option<&mut T>;

    /// Remove and return the first item with the given `id`.
    fn remove_by_id(&mut self, id: &str) -> Option<T>;

    /// Remove and return the item at `index`, or `None` if the index is out of range.
    fn remove_at(&mut self, index: usize) -> Option<T>;

    fn position_of(&self, id: &str) -> Option<usize>;

    fn contains_id(&self, id: &str) -> bool {
        self.position_of(id).is_some()
    }

    /// Ids of all items, in list order.
    fn ids(&self) -> Vec<&str>;
}

impl<T: SedIdentified> SedListOf<T> for Vec<T> {
    fn get_by_id(&self, id: &str) -> Option<&T> {
        self.iter().find(|item| item.sed_id() == id)
    }

    fn get_by_id_mut(&mut self, id: &str) -> Option<&mut T> {
        self.iter_mut().find(|item| item.sed_id() == id)
    }

    fn remove_by_id(&mut self, id: &str) -> Option<T> {
        let index = self.position_of(id)?;
        Some(self.remove(index))
    }

    fn remove_at(&mut self, index: usize) -> Option<T> {
        if index < self.len() {
            Some(self.remove(index))
        } else {
            None
        }
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.iter().position(|item| item.sed_id() == id)
    }

    fn ids(&self) -> Vec<&str> {
        self.iter().map(SedIdentified::sed_id).collect()
    }
}

/// Generates the `add_*`/`get_*`/`get_*_by_id`/`remove_*`/`remove_*_by_id`/`num_*` family
/// of methods for a list field of an element.
macro_rules! sed_list_accessors {
    ($field:ident: $item:ty, $add:ident, $get:ident, $get_by_id:ident, $remove:ident, $remove_by_id:ident, $num:ident) => {
        #[doc = concat!("Append an item to `", stringify!($field), "`.")]
        pub fn $add(&mut self, item: $item) {
            self.$field.push(item);
        }

        #[doc = concat!("Item of `", stringify!($field), "` at `index`.")]
        #[must_use]
        pub fn $get(&self, index: usize) -> Option<&$item> {
            self.$field.get(index)
        }

        #[doc = concat!("Item of `", stringify!($field), "` with the given `id`.")]
        #[must_use]
        pub fn $get_by_id(&self, id: &str) -> Option<&$item> {
            $crate::SedListOf::get_by_id(&self.$field, id)
        }

        #[doc = concat!("Remove the item of `", stringify!($field), "` at `index`.")]
        pub fn $remove(&mut self, index: usize) -> Option<$item> {
            $crate::SedListOf::remove_at(&mut self.$field, index)
        }

        #[doc = concat!("Remove the item of `", stringify!($field), "` with the given `id`.")]
        pub fn $remove_by_id(&mut self, id: &str) -> Option<$item> {
            $crate::SedListOf::remove_by_id(&mut self.$field, id)
        }

        #[must_use]
        pub fn $num(&self) -> usize {
            self.$field.len()
        }
    };
}

pub(crate) use sed_list_accessors;
