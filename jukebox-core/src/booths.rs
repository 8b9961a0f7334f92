use crate::{ParticipantId, SyncError};

/// A slot that grants the participant occupying it control over the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booth {
    pub index: usize,
    pub connected_participant: Option<ParticipantId>,
}

/// Keeps track of which participant occupies which booth.
///
/// The mapping is injective: a booth holds at most one participant, and a participant holds at most one booth.
#[derive(Debug, Clone)]
pub struct BoothRegistry {
    booths: Vec<Booth>,
}

impl BoothRegistry {
    pub fn new(count: usize) -> Self {
        Self {
            booths: (0..count)
                .map(|index| Booth {
                    index,
                    connected_participant: None,
                })
                .collect(),
        }
    }

    /// Binds a participant to a booth.
    pub fn claim(&mut self, booth_index: usize, participant_id: ParticipantId) -> Result<(), SyncError> {
        let booth = self
            .booths
            .get(booth_index)
            .ok_or(SyncError::NoSuchBooth { booth_index })?;

        if booth.connected_participant.is_some() {
            return Err(SyncError::AlreadyOccupied { booth_index });
        }

        if let Some(bound) = self.booth_of(participant_id) {
            return Err(SyncError::ParticipantAlreadyBound { booth_index: bound });
        }

        self.booths[booth_index].connected_participant = Some(participant_id);
        Ok(())
    }

    /// Clears the booth bound to the participant, if any, and returns its index.
    pub fn release(&mut self, participant_id: ParticipantId) -> Option<usize> {
        let booth = self
            .booths
            .iter_mut()
            .find(|b| b.connected_participant == Some(participant_id))?;

        booth.connected_participant = None;
        Some(booth.index)
    }

    /// Returns the participant in control of the given booth
    pub fn authority_for(&self, booth_index: usize) -> Option<ParticipantId> {
        self.booths
            .get(booth_index)
            .and_then(|b| b.connected_participant)
    }

    /// Returns the booth the participant occupies
    pub fn booth_of(&self, participant_id: ParticipantId) -> Option<usize> {
        self.booths
            .iter()
            .find(|b| b.connected_participant == Some(participant_id))
            .map(|b| b.index)
    }

    /// Returns the lowest index booth that has someone in it
    pub fn first_occupied(&self) -> Option<usize> {
        self.booths
            .iter()
            .find(|b| b.connected_participant.is_some())
            .map(|b| b.index)
    }

    pub fn booths(&self) -> &[Booth] {
        &self.booths
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    fn assert_injective(registry: &BoothRegistry) {
        let bound: Vec<_> = registry
            .booths()
            .iter()
            .filter_map(|b| b.connected_participant)
            .collect();
        let unique: HashSet<_> = bound.iter().collect();

        assert_eq!(bound.len(), unique.len(), "a participant occupies two booths");
    }

    #[test]
    fn test_claim_and_release() {
        let mut registry = BoothRegistry::new(2);
        let john = ParticipantId::new();

        registry.claim(1, john).expect("booth 1 is free");

        assert_eq!(registry.authority_for(1), Some(john));
        assert_eq!(registry.authority_for(0), None);
        assert_eq!(registry.booth_of(john), Some(1));

        assert_eq!(registry.release(john), Some(1));
        assert_eq!(registry.release(john), None, "release is idempotent");
        assert_eq!(registry.authority_for(1), None);
    }

    #[test]
    fn test_claim_conflicts() {
        let mut registry = BoothRegistry::new(2);
        let john = ParticipantId::new();
        let mary = ParticipantId::new();

        registry.claim(0, john).unwrap();

        assert_eq!(
            registry.claim(0, mary),
            Err(SyncError::AlreadyOccupied { booth_index: 0 })
        );
        assert_eq!(
            registry.claim(1, john),
            Err(SyncError::ParticipantAlreadyBound { booth_index: 0 })
        );
        assert_eq!(
            registry.claim(5, mary),
            Err(SyncError::NoSuchBooth { booth_index: 5 })
        );
        assert_eq!(registry.authority_for(1), None, "failed claims leave booths untouched");
    }

    #[test]
    fn test_mapping_stays_injective() {
        let mut registry = BoothRegistry::new(3);
        let participants: Vec<_> = (0..4).map(|_| ParticipantId::new()).collect();

        // Every participant tries every booth, with releases sprinkled in between.
        for round in 0..3 {
            for (i, participant) in participants.iter().enumerate() {
                for booth in 0..3 {
                    let _ = registry.claim((booth + i + round) % 3, *participant);
                    assert_injective(&registry);
                }

                if (i + round) % 2 == 0 {
                    registry.release(*participant);
                    assert_injective(&registry);
                }
            }
        }
    }

    #[test]
    fn test_first_occupied() {
        let mut registry = BoothRegistry::new(3);
        assert_eq!(registry.first_occupied(), None);

        registry.claim(2, ParticipantId::new()).unwrap();
        registry.claim(1, ParticipantId::new()).unwrap();

        assert_eq!(registry.first_occupied(), Some(1));
    }
}
