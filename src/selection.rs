use crate::formats::{Condition, ItemId, SelectedBook};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    books: Vec<SelectedBook>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_books(books: impl IntoIterator<Item = SelectedBook>) -> Self {
        let mut store = Self::new();
        for book in books {
            store.add(book);
        }
        store
    }

    pub fn add(&mut self, book: SelectedBook) -> bool {
        if self.contains(book.item_id) {
            tracing::debug!(item_id = book.item_id, "book already selected");
            return false;
        }
        self.books.push(book);
        true
    }

    pub fn remove(&mut self, item_id: ItemId) -> bool {
        let before = self.books.len();
        self.books.retain(|book| book.item_id != item_id);
        self.books.len() != before
    }

    pub fn update_condition(&mut self, item_id: ItemId, condition: Condition) -> bool {
        match self.books.iter_mut().find(|book| book.item_id == item_id) {
            Some(book) => {
                book.min_condition = condition;
                true
            }
            None => false,
        }
    }

    pub fn update_all_conditions(&mut self, condition: Condition) {
        for book in &mut self.books {
            book.min_condition = condition;
        }
    }

    pub fn list(&self) -> &[SelectedBook] {
        &self.books
    }

    pub fn get(&self, item_id: ItemId) -> Option<&SelectedBook> {
        self.books.iter().find(|book| book.item_id == item_id)
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.get(item_id).is_some()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.books.iter().map(|book| book.item_id).collect()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
