use protoschema::ProtoSchema;

use crate::status::FlightStatus;

#[derive(Debug, Clone, ProtoSchema)]
#[proto(reference = "travels")]
pub struct Travels {
    pub id: String,
    pub traveller: Traveller,
    pub flights: Vec<Flight>,
    #[proto(tags = "output")]
    pub approved: Option<bool>,
}

#[derive(Debug, Clone, ProtoSchema)]
pub struct Traveller {
    pub first_name: String,
    pub last_name: String,
    pub address: Address,
}

#[derive(Debug, Clone, ProtoSchema)]
pub struct Address {
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, ProtoSchema)]
pub struct Flight {
    pub number: String,
    pub departure: chrono::DateTime<chrono::Utc>,
    pub status: FlightStatus,
}
