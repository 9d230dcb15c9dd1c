//! Reassessment zone
//!
//! Re-examines patients pulled out of a treatment zone's waiting area. The
//! assigned severity is corrected to the truth with the configured accuracy,
//! the patient is marked reassessed, and it is routed back to a zone with
//! the same table triage uses.

use crate::arrivals::ServiceTime;
use crate::events::EventKind;
use crate::models::event::Event;
use crate::models::location::{StationName, ZoneId};
use crate::models::patient::PatientId;
use crate::models::waiting_area::PrioritizationPolicy;
use crate::stations::{route_by_assigned_esi, Departure, ServiceStation, StationContext, StationCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reassessment outcomes kept for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassessmentCounters {
    /// Reassigned to a more severe level
    pub up_triage: usize,
    /// Reassigned to a less severe level
    pub down_triage: usize,
    pub no_change: usize,
    /// Completed reassessments by the zone the patient was pulled from,
    /// indexed by [`ZoneId::index`]
    pub by_origin_zone: [usize; 4],
}

impl ReassessmentCounters {
    pub fn total(&self) -> usize {
        self.up_triage + self.down_triage + self.no_change
    }

    pub fn from_zone(&self, zone: ZoneId) -> usize {
        self.by_origin_zone[zone.index()]
    }
}

#[derive(Debug, Clone)]
pub struct ReassessmentStation {
    core: StationCore,
    accuracy: f64,
    counters: ReassessmentCounters,
}

impl ReassessmentStation {
    pub fn new(
        num_beds: usize,
        staff: usize,
        service: ServiceTime,
        policy: PrioritizationPolicy,
        accuracy: f64,
    ) -> Self {
        Self {
            core: StationCore::multi_resource(
                StationName::Reassessment,
                num_beds,
                staff,
                service,
                policy,
            ),
            accuracy,
            counters: ReassessmentCounters::default(),
        }
    }

    pub fn counters(&self) -> &ReassessmentCounters {
        &self.counters
    }
}

impl ServiceStation for ReassessmentStation {
    fn core(&self) -> &StationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StationCore {
        &mut self.core
    }

    fn departure_kind(&self) -> EventKind {
        EventKind::ReassessmentDeparture
    }

    fn next_destination(&mut self, patient: PatientId, ctx: &mut StationContext<'_>) -> Departure {
        let record = &ctx.patients[patient];
        let previous = record.routing_esi();
        let true_esi = record.esi();
        let origin = record.reassessment().origin_zone;

        let assigned = if ctx.rng.chance(self.accuracy) {
            true_esi
        } else {
            previous
        };
        if assigned < previous {
            self.counters.up_triage += 1;
        } else if assigned > previous {
            self.counters.down_triage += 1;
        } else {
            self.counters.no_change += 1;
        }
        if let Some(zone) = origin {
            self.counters.by_origin_zone[zone.index()] += 1;
        }

        let record = &mut ctx.patients[patient];
        record.set_assigned_esi(assigned);
        record.reassessment_mut().reassessed = true;
        ctx.log.log(Event::ReassessmentCompleted {
            time: ctx.now,
            patient,
            previous_esi: previous,
            assigned_esi: assigned,
        });
        debug!(time = ctx.now, %patient, ?previous, ?assigned, "reassessed");

        let zone = route_by_assigned_esi(assigned, ctx.rng);
        Departure::Route(zone.station_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::{Esi, PatientProfile};
    use crate::stations::test_support::Harness;

    #[test]
    fn test_perfect_accuracy_restores_true_severity() {
        let mut h = Harness::new(2);
        let mut station =
            ReassessmentStation::new(1, 1, ServiceTime::new(5.0, 2.0), PrioritizationPolicy::default(), 1.0);
        let p = h.patients.create(PatientProfile::with_esi(Esi::Emergent));
        h.patients[p].set_assigned_esi(Esi::LessUrgent);
        h.patients[p].reassessment_mut().origin_zone = Some(ZoneId::FastTrack);

        let departure = station.next_destination(p, &mut h.ctx());

        assert_eq!(departure, Departure::Route(StationName::Red));
        assert_eq!(h.patients[p].assigned_esi(), Some(Esi::Emergent));
        assert!(h.patients[p].reassessment().reassessed);
        assert_eq!(station.counters().up_triage, 1);
        assert_eq!(station.counters().from_zone(ZoneId::FastTrack), 1);
    }

    #[test]
    fn test_zero_accuracy_leaves_assignment() {
        let mut h = Harness::new(2);
        let mut station =
            ReassessmentStation::new(1, 1, ServiceTime::new(5.0, 2.0), PrioritizationPolicy::default(), 0.0);
        let p = h.patients.create(PatientProfile::with_esi(Esi::Emergent));
        h.patients[p].set_assigned_esi(Esi::NonUrgent);

        station.next_destination(p, &mut h.ctx());

        assert_eq!(h.patients[p].assigned_esi(), Some(Esi::NonUrgent));
        assert_eq!(station.counters().no_change, 1);
        assert_eq!(station.counters().total(), 1);
    }
}
