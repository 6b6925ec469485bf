use serde::Serialize;

use crate::models::Guest;

/// Attendance counts over a snapshot of guests.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GuestTally {
    /// Seats expected: every record, plus granted plus-ones, minus the
    /// plus-ones that already have their own record.
    pub total: usize,
    pub is_adult: usize,
    pub is_kid: usize,
    pub with_plus_one: usize,
    pub is_plus_one: usize,
    pub pending: usize,
    pub attending: usize,
    pub not_attending: usize,
    pub adult_attending: usize,
    pub kid_attending: usize,
    pub adult_not_attending: usize,
    pub kid_not_attending: usize,
}

impl GuestTally {
    pub fn from_guests(guests: &[Guest]) -> Self {
        let mut tally = GuestTally::default();

        for guest in guests {
            if guest.is_kid {
                tally.is_kid += 1;
            } else {
                tally.is_adult += 1;
            }

            if guest.is_pending {
                tally.pending += 1;
            } else {
                match guest.is_attending {
                    Some(true) => {
                        tally.attending += 1;
                        if guest.is_kid {
                            tally.kid_attending += 1;
                        } else {
                            tally.adult_attending += 1;
                        }
                    }
                    Some(false) => {
                        tally.not_attending += 1;
                        if guest.is_kid {
                            tally.kid_not_attending += 1;
                        } else {
                            tally.adult_not_attending += 1;
                        }
                    }
                    None => {}
                }
            }

            if guest.with_plus_one {
                tally.with_plus_one += 1;
            }
            if guest.is_plus_one {
                tally.is_plus_one += 1;
            }
        }

        // is_plus_one <= guests.len(), so this cannot underflow
        tally.total = guests.len() + tally.with_plus_one - tally.is_plus_one;
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Menu;
    use chrono::Utc;
    use uuid::Uuid;

    fn guest(
        is_kid: bool,
        is_attending: Option<bool>,
        is_pending: bool,
        with_plus_one: bool,
        is_plus_one: bool,
    ) -> Guest {
        Guest {
            id: Uuid::new_v4(),
            name: "G".to_string(),
            last_name: String::new(),
            invitation_id: Uuid::nil(),
            is_attending,
            is_pending,
            is_kid,
            menu: Menu::NoRestriction,
            with_plus_one,
            is_plus_one,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_list_tallies_to_zero() {
        assert_eq!(GuestTally::from_guests(&[]), GuestTally::default());
    }

    #[test]
    fn total_counts_granted_but_unfilled_plus_ones() {
        let guests = [
            guest(false, Some(true), false, true, false),
            guest(false, Some(true), false, true, false),
            guest(false, Some(true), false, false, true),
        ];

        let tally = GuestTally::from_guests(&guests);

        assert_eq!(tally.with_plus_one, 2);
        assert_eq!(tally.is_plus_one, 1);
        assert_eq!(tally.total, 3 + 2 - 1);
    }

    #[test]
    fn splits_by_age_and_response() {
        let guests = [
            guest(false, Some(true), false, false, false),
            guest(true, Some(true), false, false, false),
            guest(false, Some(false), false, false, false),
            guest(true, Some(false), false, false, false),
            guest(true, None, true, false, false),
            // answered "yes" earlier but flagged pending again: counts as pending only
            guest(false, Some(true), true, false, false),
            // not pending but never answered: counts nowhere
            guest(false, None, false, false, false),
        ];

        let tally = GuestTally::from_guests(&guests);

        assert_eq!(tally.is_adult, 4);
        assert_eq!(tally.is_kid, 3);
        assert_eq!(tally.attending, 2);
        assert_eq!(tally.adult_attending, 1);
        assert_eq!(tally.kid_attending, 1);
        assert_eq!(tally.not_attending, 2);
        assert_eq!(tally.adult_not_attending, 1);
        assert_eq!(tally.kid_not_attending, 1);
        assert_eq!(tally.pending, 2);
        assert_eq!(tally.total, 7);
    }
}
