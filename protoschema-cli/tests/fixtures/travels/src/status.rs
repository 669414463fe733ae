use protoschema::ProtoSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ProtoSchema)]
pub enum FlightStatus {
    Scheduled,
    Boarding,
    #[proto(number = 10)]
    Departed,
    Cancelled,
}
