//! Registration desk. Everyone who reaches it goes on to triage.

use crate::arrivals::ServiceTime;
use crate::events::EventKind;
use crate::models::location::StationName;
use crate::models::patient::PatientId;
use crate::models::waiting_area::PrioritizationPolicy;
use crate::stations::{Departure, ServiceStation, StationContext, StationCore};

#[derive(Debug, Clone)]
pub struct RegistrationStation {
    core: StationCore,
}

impl RegistrationStation {
    pub fn new(num_beds: usize, service: ServiceTime, policy: PrioritizationPolicy) -> Self {
        Self {
            core: StationCore::single_bed(StationName::Registration, num_beds, service, policy),
        }
    }
}

impl ServiceStation for RegistrationStation {
    fn core(&self) -> &StationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StationCore {
        &mut self.core
    }

    fn departure_kind(&self) -> EventKind {
        EventKind::RegistrationDeparture
    }

    fn next_destination(&mut self, _patient: PatientId, _ctx: &mut StationContext<'_>) -> Departure {
        Departure::Route(StationName::Triage)
    }
}
