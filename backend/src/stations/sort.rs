//! Sort nurse: first contact at the door.
//!
//! Sees the patient's true severity and sends the sickest straight to the
//! acute zone, bypassing registration and triage. Everyone else continues
//! down the intake pipeline.

use crate::arrivals::ServiceTime;
use crate::events::EventKind;
use crate::models::location::{StationName, ZoneId};
use crate::models::patient::{Esi, PatientId};
use crate::models::waiting_area::PrioritizationPolicy;
use crate::stations::{Departure, ServiceStation, StationContext, StationCore};

/// Probability that an ESI 1 patient goes straight to the acute zone
pub const ESI1_DIRECT_TO_ACUTE: f64 = 0.95;

/// Probability that an ESI 2 patient goes straight to the acute zone
pub const ESI2_DIRECT_TO_ACUTE: f64 = 0.10;

#[derive(Debug, Clone)]
pub struct SortStation {
    core: StationCore,
}

impl SortStation {
    pub fn new(num_beds: usize, service: ServiceTime, policy: PrioritizationPolicy) -> Self {
        Self {
            core: StationCore::single_bed(StationName::Sort, num_beds, service, policy),
        }
    }
}

impl ServiceStation for SortStation {
    fn core(&self) -> &StationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StationCore {
        &mut self.core
    }

    fn departure_kind(&self) -> EventKind {
        EventKind::SortDeparture
    }

    fn next_destination(&mut self, patient: PatientId, ctx: &mut StationContext<'_>) -> Departure {
        let direct = match ctx.patients[patient].esi() {
            Esi::Resuscitation => ctx.rng.chance(ESI1_DIRECT_TO_ACUTE),
            Esi::Emergent => ctx.rng.chance(ESI2_DIRECT_TO_ACUTE),
            _ => false,
        };
        if direct {
            ctx.patients[patient].set_original_zone(ZoneId::Eru);
            Departure::Route(StationName::Eru)
        } else {
            Departure::Route(StationName::Registration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::PatientProfile;
    use crate::stations::test_support::Harness;

    #[test]
    fn test_low_acuity_always_registers() {
        let mut h = Harness::new(11);
        let mut sort = SortStation::new(1, ServiceTime::new(4.0, 2.0), PrioritizationPolicy::default());
        for _ in 0..50 {
            let p = h.patients.create(PatientProfile::with_esi(Esi::LessUrgent));
            assert_eq!(
                sort.next_destination(p, &mut h.ctx()),
                Departure::Route(StationName::Registration)
            );
        }
    }

    #[test]
    fn test_most_esi1_bypass_to_acute() {
        let mut h = Harness::new(12);
        let mut sort = SortStation::new(1, ServiceTime::new(4.0, 2.0), PrioritizationPolicy::default());
        let mut direct = 0;
        for _ in 0..1000 {
            let p = h.patients.create(PatientProfile::with_esi(Esi::Resuscitation));
            if sort.next_destination(p, &mut h.ctx()) == Departure::Route(StationName::Eru) {
                direct += 1;
                assert_eq!(h.patients[p].original_zone(), Some(ZoneId::Eru));
            }
        }
        assert!(direct > 900, "only {} of 1000 went direct", direct);
    }
}
