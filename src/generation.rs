#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Default)]
pub struct RequestGeneration {
    issued: u64,
}

impl RequestGeneration {
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }
}

#[derive(Debug, Clone)]
pub struct Latest<T> {
    generation: RequestGeneration,
    value: Option<T>,
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self {
            generation: RequestGeneration::default(),
            value: None,
        }
    }
}

impl<T> Latest<T> {
    pub fn issue(&mut self) -> Ticket {
        self.generation.issue()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.is_current(ticket)
    }

    pub fn publish(&mut self, ticket: Ticket, value: T) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(?ticket, "dropping stale response");
            return false;
        }
        self.value = Some(value);
        true
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn clear(&mut self) {
        self.value = None;
    }
}
