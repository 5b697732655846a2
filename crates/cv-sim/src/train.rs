//! Live vehicles and the trains they make up.

use std::sync::Arc;

use cv_convoy::{ConvoyEntity, LiveVehicle};
use cv_physics::{VehicleDesc, VehicleSpec, WayContext};

/// One vehicle of a running train: a shared catalog entry plus its load and
/// the way under it.
#[derive(Clone, Debug)]
pub struct Car {
    desc:    Arc<VehicleSpec>,
    load_kg: u32,
    way:     WayContext,
}

impl Car {
    /// An empty car standing on level, unelectrified way of its own type.
    pub fn new(desc: Arc<VehicleSpec>) -> Self {
        let way = WayContext::flat(desc.way, desc.max_speed_kmh);
        Self { desc, load_kg: 0, way }
    }

    #[inline]
    pub fn spec(&self) -> &Arc<VehicleSpec> {
        &self.desc
    }

    #[inline]
    pub fn load_kg(&self) -> u32 {
        self.load_kg
    }

    /// Payload of a full car, kg.
    pub fn max_load_kg(&self) -> u32 {
        self.desc
            .freight
            .map_or(0, |f| self.desc.capacity.saturating_mul(f.max_kg))
    }

    pub fn fill(&mut self) {
        self.load_kg = self.max_load_kg();
    }

    pub fn empty(&mut self) {
        self.load_kg = 0;
    }

    pub fn set_way(&mut self, way: WayContext) {
        self.way = way;
    }
}

impl LiveVehicle for Car {
    type Desc = VehicleSpec;

    fn desc(&self) -> &VehicleSpec {
        &self.desc
    }

    fn gross_weight_kg(&self) -> i32 {
        let tare = (self.desc.weight_t() as i64) * 1000;
        (tare + self.load_kg as i64).min(i32::MAX as i64) as i32
    }

    fn way_context(&self) -> WayContext {
        self.way
    }
}

/// An ordered list of cars, front first.
#[derive(Clone, Debug, Default)]
pub struct Train {
    cars: Vec<Car>,
}

impl Train {
    pub fn new(specs: impl IntoIterator<Item = Arc<VehicleSpec>>) -> Self {
        Self { cars: specs.into_iter().map(Car::new).collect() }
    }

    #[inline]
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Put every car onto `way`.
    pub fn set_way(&mut self, way: WayContext) {
        for car in &mut self.cars {
            car.set_way(way);
        }
    }

    pub fn fill(&mut self) {
        self.cars.iter_mut().for_each(Car::fill);
    }

    pub fn empty(&mut self) {
        self.cars.iter_mut().for_each(Car::empty);
    }

    pub fn payload_kg(&self) -> u64 {
        self.cars.iter().map(|c| c.load_kg as u64).sum()
    }

    pub fn is_loaded(&self) -> bool {
        self.payload_kg() > 0
    }
}

impl ConvoyEntity for Train {
    type Vehicle = Car;

    fn vehicles(&self) -> &[Car] {
        &self.cars
    }
}
