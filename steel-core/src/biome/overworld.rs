//! The vanilla overworld biome parameter list.
//!
//! Inland terrain is split into weirdness slices (valleys, low, mid, high and
//! peaks). Each slice places biomes from the temperature by humidity tables
//! below according to continentalness and erosion.

use super::{
    BiomeRef,
    climate::{Parameter, ParameterList, ParameterPoint},
    vanilla::{
        BADLANDS, BAMBOO_JUNGLE, BEACH, BIRCH_FOREST, CHERRY_GROVE, COLD_OCEAN, DARK_FOREST,
        DEEP_COLD_OCEAN, DEEP_DARK, DEEP_FROZEN_OCEAN, DEEP_LUKEWARM_OCEAN, DEEP_OCEAN, DESERT,
        DRIPSTONE_CAVES, ERODED_BADLANDS, FLOWER_FOREST, FOREST, FROZEN_OCEAN, FROZEN_PEAKS,
        FROZEN_RIVER, GROVE, ICE_SPIKES, JAGGED_PEAKS, JUNGLE, LUKEWARM_OCEAN, LUSH_CAVES,
        MANGROVE_SWAMP, MEADOW, MUSHROOM_FIELDS, OCEAN, OLD_GROWTH_BIRCH_FOREST,
        OLD_GROWTH_PINE_TAIGA, OLD_GROWTH_SPRUCE_TAIGA, PLAINS, RIVER, SAVANNA, SAVANNA_PLATEAU,
        SNOWY_BEACH, SNOWY_PLAINS, SNOWY_SLOPES, SNOWY_TAIGA, SPARSE_JUNGLE, STONY_PEAKS,
        STONY_SHORE, SUNFLOWER_PLAINS, SWAMP, TAIGA, WARM_OCEAN, WINDSWEPT_FOREST,
        WINDSWEPT_GRAVELLY_HILLS, WINDSWEPT_HILLS, WINDSWEPT_SAVANNA, WOODED_BADLANDS,
    },
};

type Table = [[Option<BiomeRef>; 5]; 5];

static OCEANS: [[BiomeRef; 5]; 2] = [
    [&DEEP_FROZEN_OCEAN, &DEEP_COLD_OCEAN, &DEEP_OCEAN, &DEEP_LUKEWARM_OCEAN, &WARM_OCEAN],
    [&FROZEN_OCEAN, &COLD_OCEAN, &OCEAN, &LUKEWARM_OCEAN, &WARM_OCEAN],
];

static MIDDLE_BIOMES: Table = [
    [Some(&SNOWY_PLAINS), Some(&SNOWY_PLAINS), Some(&SNOWY_PLAINS), Some(&SNOWY_TAIGA), Some(&TAIGA)],
    [Some(&PLAINS), Some(&PLAINS), Some(&FOREST), Some(&TAIGA), Some(&OLD_GROWTH_SPRUCE_TAIGA)],
    [Some(&FLOWER_FOREST), Some(&PLAINS), Some(&FOREST), Some(&BIRCH_FOREST), Some(&DARK_FOREST)],
    [Some(&SAVANNA), Some(&SAVANNA), Some(&FOREST), Some(&JUNGLE), Some(&JUNGLE)],
    [Some(&DESERT), Some(&DESERT), Some(&DESERT), Some(&DESERT), Some(&DESERT)],
];

static MIDDLE_BIOMES_VARIANT: Table = [
    [Some(&ICE_SPIKES), None, Some(&SNOWY_TAIGA), None, None],
    [None, None, None, None, Some(&OLD_GROWTH_PINE_TAIGA)],
    [Some(&SUNFLOWER_PLAINS), None, None, Some(&OLD_GROWTH_BIRCH_FOREST), None],
    [None, None, Some(&PLAINS), Some(&SPARSE_JUNGLE), Some(&BAMBOO_JUNGLE)],
    [None, None, None, None, None],
];

static PLATEAU_BIOMES: Table = [
    [Some(&SNOWY_PLAINS), Some(&SNOWY_PLAINS), Some(&SNOWY_PLAINS), Some(&SNOWY_TAIGA), Some(&SNOWY_TAIGA)],
    [Some(&MEADOW), Some(&MEADOW), Some(&FOREST), Some(&TAIGA), Some(&OLD_GROWTH_SPRUCE_TAIGA)],
    [Some(&MEADOW), Some(&MEADOW), Some(&MEADOW), Some(&MEADOW), Some(&DARK_FOREST)],
    [Some(&SAVANNA_PLATEAU), Some(&SAVANNA_PLATEAU), Some(&FOREST), Some(&FOREST), Some(&JUNGLE)],
    [Some(&BADLANDS), Some(&BADLANDS), Some(&BADLANDS), Some(&WOODED_BADLANDS), Some(&WOODED_BADLANDS)],
];

static PLATEAU_BIOMES_VARIANT: Table = [
    [Some(&ICE_SPIKES), None, None, None, None],
    [Some(&CHERRY_GROVE), None, Some(&MEADOW), Some(&MEADOW), Some(&OLD_GROWTH_PINE_TAIGA)],
    [Some(&CHERRY_GROVE), Some(&CHERRY_GROVE), Some(&FOREST), Some(&BIRCH_FOREST), None],
    [None, None, None, None, None],
    [Some(&ERODED_BADLANDS), Some(&ERODED_BADLANDS), None, None, None],
];

static SHATTERED_BIOMES: Table = [
    [Some(&WINDSWEPT_GRAVELLY_HILLS), Some(&WINDSWEPT_GRAVELLY_HILLS), Some(&WINDSWEPT_HILLS), Some(&WINDSWEPT_FOREST), Some(&WINDSWEPT_FOREST)],
    [Some(&WINDSWEPT_GRAVELLY_HILLS), Some(&WINDSWEPT_GRAVELLY_HILLS), Some(&WINDSWEPT_HILLS), Some(&WINDSWEPT_FOREST), Some(&WINDSWEPT_FOREST)],
    [Some(&WINDSWEPT_HILLS), Some(&WINDSWEPT_HILLS), Some(&WINDSWEPT_HILLS), Some(&WINDSWEPT_FOREST), Some(&WINDSWEPT_FOREST)],
    [None, None, None, None, None],
    [None, None, None, None, None],
];

/// Builds the overworld climate to biome mapping.
pub struct OverworldBiomeBuilder {
    full_range: Parameter,
    temperatures: [Parameter; 5],
    humidities: [Parameter; 5],
    erosions: [Parameter; 7],
    frozen_range: Parameter,
    unfrozen_range: Parameter,
    mushroom_fields_continentalness: Parameter,
    deep_ocean_continentalness: Parameter,
    ocean_continentalness: Parameter,
    coast_continentalness: Parameter,
    inland_continentalness: Parameter,
    near_inland_continentalness: Parameter,
    mid_inland_continentalness: Parameter,
    far_inland_continentalness: Parameter,
    out: Vec<(ParameterPoint, BiomeRef)>,
}

impl Default for OverworldBiomeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

const fn is_negative(weirdness: Parameter) -> bool {
    weirdness.max < 0
}

impl OverworldBiomeBuilder {
    /// A builder with the vanilla climate tables.
    #[must_use]
    pub fn new() -> Self {
        let temperatures = [
            Parameter::span(-1.0, -0.45),
            Parameter::span(-0.45, -0.15),
            Parameter::span(-0.15, 0.2),
            Parameter::span(0.2, 0.55),
            Parameter::span(0.55, 1.0),
        ];
        Self {
            full_range: Parameter::span(-1.0, 1.0),
            temperatures,
            humidities: [
                Parameter::span(-1.0, -0.35),
                Parameter::span(-0.35, -0.1),
                Parameter::span(-0.1, 0.1),
                Parameter::span(0.1, 0.3),
                Parameter::span(0.3, 1.0),
            ],
            erosions: [
                Parameter::span(-1.0, -0.78),
                Parameter::span(-0.78, -0.375),
                Parameter::span(-0.375, -0.2225),
                Parameter::span(-0.2225, 0.05),
                Parameter::span(0.05, 0.45),
                Parameter::span(0.45, 0.55),
                Parameter::span(0.55, 1.0),
            ],
            frozen_range: temperatures[0],
            unfrozen_range: Parameter::spanning(temperatures[1], temperatures[4]),
            mushroom_fields_continentalness: Parameter::span(-1.2, -1.05),
            deep_ocean_continentalness: Parameter::span(-1.05, -0.455),
            ocean_continentalness: Parameter::span(-0.455, -0.19),
            coast_continentalness: Parameter::span(-0.19, -0.11),
            inland_continentalness: Parameter::span(-0.11, 0.55),
            near_inland_continentalness: Parameter::span(-0.11, 0.03),
            mid_inland_continentalness: Parameter::span(0.03, 0.3),
            far_inland_continentalness: Parameter::span(0.3, 1.0),
            out: Vec::new(),
        }
    }

    /// The full overworld list, in vanilla order.
    #[must_use]
    pub fn build(mut self) -> ParameterList<BiomeRef> {
        self.add_off_coast_biomes();
        self.add_inland_biomes();
        self.add_underground_biomes();
        ParameterList::new(self.out)
    }

    fn add_off_coast_biomes(&mut self) {
        let full = self.full_range;
        self.add_surface_biome(
            full,
            full,
            self.mushroom_fields_continentalness,
            full,
            full,
            0.0,
            &MUSHROOM_FIELDS,
        );
        let temperatures = self.temperatures;
        for (i, &temperature) in temperatures.iter().enumerate() {
            self.add_surface_biome(
                temperature,
                full,
                self.deep_ocean_continentalness,
                full,
                full,
                0.0,
                OCEANS[0][i],
            );
            self.add_surface_biome(
                temperature,
                full,
                self.ocean_continentalness,
                full,
                full,
                0.0,
                OCEANS[1][i],
            );
        }
    }

    fn add_inland_biomes(&mut self) {
        self.add_mid_slice(Parameter::span(-1.0, -0.933_333_34));
        self.add_high_slice(Parameter::span(-0.933_333_34, -0.766_666_7));
        self.add_peaks(Parameter::span(-0.766_666_7, -0.566_666_66));
        self.add_high_slice(Parameter::span(-0.566_666_66, -0.4));
        self.add_mid_slice(Parameter::span(-0.4, -0.266_666_68));
        self.add_low_slice(Parameter::span(-0.266_666_68, -0.05));
        self.add_valleys(Parameter::span(-0.05, 0.05));
        self.add_low_slice(Parameter::span(0.05, 0.266_666_68));
        self.add_mid_slice(Parameter::span(0.266_666_68, 0.4));
        self.add_high_slice(Parameter::span(0.4, 0.566_666_66));
        self.add_peaks(Parameter::span(0.566_666_66, 0.766_666_7));
        self.add_high_slice(Parameter::span(0.766_666_7, 0.933_333_34));
        self.add_mid_slice(Parameter::span(0.933_333_34, 1.0));
    }

    fn add_peaks(&mut self, weirdness: Parameter) {
        let coast = self.coast_continentalness;
        let near = self.near_inland_continentalness;
        let mid = self.mid_inland_continentalness;
        let far = self.far_inland_continentalness;
        let e = self.erosions;
        for i in 0..self.temperatures.len() {
            let temperature = self.temperatures[i];
            for j in 0..self.humidities.len() {
                let humidity = self.humidities[j];
                let middle = pick_middle_biome(i, j, weirdness);
                let middle_or_badlands = pick_middle_biome_or_badlands_if_hot(i, j, weirdness);
                let middle_or_badlands_or_slope =
                    pick_middle_biome_or_badlands_if_hot_or_slope_if_cold(i, j, weirdness);
                let plateau = pick_plateau_biome(i, j, weirdness);
                let shattered = pick_shattered_biome(i, j, weirdness);
                let shattered_or_savanna =
                    maybe_pick_windswept_savanna_biome(i, j, weirdness, shattered);
                let peak = pick_peak_biome(i, j, weirdness);

                let mut add = |continentalness: Parameter, erosion: Parameter, biome: BiomeRef| {
                    self.add_surface_biome(
                        temperature,
                        humidity,
                        continentalness,
                        erosion,
                        weirdness,
                        0.0,
                        biome,
                    );
                };
                add(Parameter::spanning(coast, far), e[0], peak);
                add(Parameter::spanning(coast, near), e[1], middle_or_badlands_or_slope);
                add(Parameter::spanning(mid, far), e[1], peak);
                add(Parameter::spanning(coast, near), Parameter::spanning(e[2], e[3]), middle);
                add(Parameter::spanning(mid, far), e[2], plateau);
                add(mid, e[3], middle_or_badlands);
                add(far, e[3], plateau);
                add(Parameter::spanning(coast, far), e[4], middle);
                add(Parameter::spanning(coast, near), e[5], shattered_or_savanna);
                add(Parameter::spanning(mid, far), e[5], shattered);
                add(Parameter::spanning(coast, far), e[6], middle);
            }
        }
    }

    fn add_high_slice(&mut self, weirdness: Parameter) {
        let coast = self.coast_continentalness;
        let near = self.near_inland_continentalness;
        let mid = self.mid_inland_continentalness;
        let far = self.far_inland_continentalness;
        let e = self.erosions;
        for i in 0..self.temperatures.len() {
            let temperature = self.temperatures[i];
            for j in 0..self.humidities.len() {
                let humidity = self.humidities[j];
                let middle = pick_middle_biome(i, j, weirdness);
                let middle_or_badlands = pick_middle_biome_or_badlands_if_hot(i, j, weirdness);
                let middle_or_badlands_or_slope =
                    pick_middle_biome_or_badlands_if_hot_or_slope_if_cold(i, j, weirdness);
                let plateau = pick_plateau_biome(i, j, weirdness);
                let shattered = pick_shattered_biome(i, j, weirdness);
                let shattered_or_savanna =
                    maybe_pick_windswept_savanna_biome(i, j, weirdness, middle);
                let slope = pick_slope_biome(i, j, weirdness);
                let peak = pick_peak_biome(i, j, weirdness);

                let mut add = |continentalness: Parameter, erosion: Parameter, biome: BiomeRef| {
                    self.add_surface_biome(
                        temperature,
                        humidity,
                        continentalness,
                        erosion,
                        weirdness,
                        0.0,
                        biome,
                    );
                };
                add(coast, Parameter::spanning(e[0], e[1]), middle);
                add(near, e[0], slope);
                add(Parameter::spanning(mid, far), e[0], peak);
                add(near, e[1], middle_or_badlands_or_slope);
                add(Parameter::spanning(mid, far), e[1], slope);
                add(Parameter::spanning(coast, near), Parameter::spanning(e[2], e[3]), middle);
                add(Parameter::spanning(mid, far), e[2], plateau);
                add(mid, e[3], middle_or_badlands);
                add(far, e[3], plateau);
                add(Parameter::spanning(coast, far), e[4], middle);
                add(Parameter::spanning(coast, near), e[5], shattered_or_savanna);
                add(Parameter::spanning(mid, far), e[5], shattered);
                add(Parameter::spanning(coast, far), e[6], middle);
            }
        }
    }

    fn add_swamps(&mut self, weirdness: Parameter, inland: Parameter) {
        let full = self.full_range;
        let t = self.temperatures;
        let wettest = self.erosions[6];
        self.add_surface_biome(
            Parameter::spanning(t[1], t[2]),
            full,
            inland,
            wettest,
            weirdness,
            0.0,
            &SWAMP,
        );
        self.add_surface_biome(
            Parameter::spanning(t[3], t[4]),
            full,
            inland,
            wettest,
            weirdness,
            0.0,
            &MANGROVE_SWAMP,
        );
    }

    fn add_mid_slice(&mut self, weirdness: Parameter) {
        let full = self.full_range;
        let coast = self.coast_continentalness;
        let near = self.near_inland_continentalness;
        let mid = self.mid_inland_continentalness;
        let far = self.far_inland_continentalness;
        let e = self.erosions;
        self.add_surface_biome(
            full,
            full,
            coast,
            Parameter::spanning(e[0], e[2]),
            weirdness,
            0.0,
            &STONY_SHORE,
        );
        self.add_swamps(weirdness, Parameter::spanning(near, far));

        for i in 0..self.temperatures.len() {
            let temperature = self.temperatures[i];
            for j in 0..self.humidities.len() {
                let humidity = self.humidities[j];
                let middle = pick_middle_biome(i, j, weirdness);
                let middle_or_badlands = pick_middle_biome_or_badlands_if_hot(i, j, weirdness);
                let middle_or_badlands_or_slope =
                    pick_middle_biome_or_badlands_if_hot_or_slope_if_cold(i, j, weirdness);
                let shattered = pick_shattered_biome(i, j, weirdness);
                let plateau = pick_plateau_biome(i, j, weirdness);
                let beach = pick_beach_biome(i, j);
                let shattered_or_savanna =
                    maybe_pick_windswept_savanna_biome(i, j, weirdness, middle);
                let shattered_coast = pick_shattered_coast_biome(i, j, weirdness);
                let slope = pick_slope_biome(i, j, weirdness);

                let mut add = |continentalness: Parameter, erosion: Parameter, biome: BiomeRef| {
                    self.add_surface_biome(
                        temperature,
                        humidity,
                        continentalness,
                        erosion,
                        weirdness,
                        0.0,
                        biome,
                    );
                };
                add(Parameter::spanning(near, far), e[0], slope);
                add(Parameter::spanning(near, mid), e[1], middle_or_badlands_or_slope);
                add(far, e[1], if i == 0 { slope } else { plateau });
                add(near, e[2], middle);
                add(mid, e[2], middle_or_badlands);
                add(far, e[2], plateau);
                add(Parameter::spanning(coast, near), e[3], middle);
                add(Parameter::spanning(mid, far), e[3], middle_or_badlands);
                if is_negative(weirdness) {
                    add(coast, e[4], beach);
                    add(Parameter::spanning(near, far), e[4], middle);
                } else {
                    add(Parameter::spanning(coast, far), e[4], middle);
                }
                add(coast, e[5], shattered_coast);
                add(near, e[5], shattered_or_savanna);
                add(Parameter::spanning(mid, far), e[5], shattered);
                if is_negative(weirdness) {
                    add(coast, e[6], beach);
                } else {
                    add(coast, e[6], middle);
                }
                if i == 0 {
                    add(Parameter::spanning(near, far), e[6], middle);
                }
            }
        }
    }

    fn add_low_slice(&mut self, weirdness: Parameter) {
        let full = self.full_range;
        let coast = self.coast_continentalness;
        let near = self.near_inland_continentalness;
        let mid = self.mid_inland_continentalness;
        let far = self.far_inland_continentalness;
        let e = self.erosions;
        self.add_surface_biome(
            full,
            full,
            coast,
            Parameter::spanning(e[0], e[2]),
            weirdness,
            0.0,
            &STONY_SHORE,
        );
        self.add_swamps(weirdness, Parameter::spanning(near, far));

        for i in 0..self.temperatures.len() {
            let temperature = self.temperatures[i];
            for j in 0..self.humidities.len() {
                let humidity = self.humidities[j];
                let middle = pick_middle_biome(i, j, weirdness);
                let middle_or_badlands = pick_middle_biome_or_badlands_if_hot(i, j, weirdness);
                let middle_or_badlands_or_slope =
                    pick_middle_biome_or_badlands_if_hot_or_slope_if_cold(i, j, weirdness);
                let beach = pick_beach_biome(i, j);
                let shattered_or_savanna =
                    maybe_pick_windswept_savanna_biome(i, j, weirdness, middle);
                let shattered_coast = pick_shattered_coast_biome(i, j, weirdness);

                let mut add = |continentalness: Parameter, erosion: Parameter, biome: BiomeRef| {
                    self.add_surface_biome(
                        temperature,
                        humidity,
                        continentalness,
                        erosion,
                        weirdness,
                        0.0,
                        biome,
                    );
                };
                add(near, Parameter::spanning(e[0], e[1]), middle_or_badlands);
                add(
                    Parameter::spanning(mid, far),
                    Parameter::spanning(e[0], e[1]),
                    middle_or_badlands_or_slope,
                );
                add(near, Parameter::spanning(e[2], e[3]), middle);
                add(Parameter::spanning(mid, far), Parameter::spanning(e[2], e[3]), middle_or_badlands);
                add(coast, Parameter::spanning(e[3], e[4]), beach);
                add(Parameter::spanning(near, far), e[4], middle);
                add(coast, e[5], shattered_coast);
                add(near, e[5], shattered_or_savanna);
                add(Parameter::spanning(mid, far), e[5], middle);
                add(coast, e[6], beach);
                if i == 0 {
                    add(Parameter::spanning(near, far), e[6], middle);
                }
            }
        }
    }

    fn add_valleys(&mut self, weirdness: Parameter) {
        let full = self.full_range;
        let frozen = self.frozen_range;
        let unfrozen = self.unfrozen_range;
        let coast = self.coast_continentalness;
        let near = self.near_inland_continentalness;
        let mid = self.mid_inland_continentalness;
        let far = self.far_inland_continentalness;
        let inland = self.inland_continentalness;
        let e = self.erosions;
        let negative = is_negative(weirdness);

        let mut add = |temperature: Parameter,
                       continentalness: Parameter,
                       erosion: Parameter,
                       biome: BiomeRef| {
            self.add_surface_biome(
                temperature,
                full,
                continentalness,
                erosion,
                weirdness,
                0.0,
                biome,
            );
        };
        let low_erosion = Parameter::spanning(e[0], e[1]);
        add(frozen, coast, low_erosion, if negative { &STONY_SHORE } else { &FROZEN_RIVER });
        add(unfrozen, coast, low_erosion, if negative { &STONY_SHORE } else { &RIVER });
        add(frozen, near, low_erosion, &FROZEN_RIVER);
        add(unfrozen, near, low_erosion, &RIVER);
        add(frozen, Parameter::spanning(coast, far), Parameter::spanning(e[2], e[5]), &FROZEN_RIVER);
        add(unfrozen, Parameter::spanning(coast, far), Parameter::spanning(e[2], e[5]), &RIVER);
        add(frozen, coast, e[6], &FROZEN_RIVER);
        add(unfrozen, coast, e[6], &RIVER);
        self.add_swamps(weirdness, Parameter::spanning(inland, far));
        self.add_surface_biome(
            frozen,
            full,
            Parameter::spanning(inland, far),
            e[6],
            weirdness,
            0.0,
            &FROZEN_RIVER,
        );

        for i in 0..self.temperatures.len() {
            let temperature = self.temperatures[i];
            for j in 0..self.humidities.len() {
                let humidity = self.humidities[j];
                let middle_or_badlands = pick_middle_biome_or_badlands_if_hot(i, j, weirdness);
                self.add_surface_biome(
                    temperature,
                    humidity,
                    Parameter::spanning(mid, far),
                    low_erosion,
                    weirdness,
                    0.0,
                    middle_or_badlands,
                );
            }
        }
    }

    fn add_underground_biomes(&mut self) {
        let full = self.full_range;
        self.add_underground_biome(
            full,
            full,
            Parameter::span(0.8, 1.0),
            full,
            full,
            0.0,
            &DRIPSTONE_CAVES,
        );
        self.add_underground_biome(
            full,
            Parameter::span(0.7, 1.0),
            full,
            full,
            full,
            0.0,
            &LUSH_CAVES,
        );
        let low_erosion = Parameter::spanning(self.erosions[0], self.erosions[1]);
        self.out.push((
            ParameterPoint::new(
                full,
                full,
                full,
                low_erosion,
                Parameter::point(1.1),
                full,
                0.0,
            ),
            &DEEP_DARK,
        ));
    }

    /// Adds the biome at the surface and one block layer below it.
    #[allow(clippy::too_many_arguments)]
    fn add_surface_biome(
        &mut self,
        temperature: Parameter,
        humidity: Parameter,
        continentalness: Parameter,
        erosion: Parameter,
        weirdness: Parameter,
        offset: f32,
        biome: BiomeRef,
    ) {
        for depth in [0.0, 1.0] {
            self.out.push((
                ParameterPoint::new(
                    temperature,
                    humidity,
                    continentalness,
                    erosion,
                    Parameter::point(depth),
                    weirdness,
                    offset,
                ),
                biome,
            ));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn add_underground_biome(
        &mut self,
        temperature: Parameter,
        humidity: Parameter,
        continentalness: Parameter,
        erosion: Parameter,
        weirdness: Parameter,
        offset: f32,
        biome: BiomeRef,
    ) {
        self.out.push((
            ParameterPoint::new(
                temperature,
                humidity,
                continentalness,
                erosion,
                Parameter::span(0.2, 0.9),
                weirdness,
                offset,
            ),
            biome,
        ));
    }
}

fn pick_middle_biome(i: usize, j: usize, weirdness: Parameter) -> BiomeRef {
    let base = MIDDLE_BIOMES[i][j].unwrap_or(&PLAINS);
    if is_negative(weirdness) {
        base
    } else {
        MIDDLE_BIOMES_VARIANT[i][j].unwrap_or(base)
    }
}

fn pick_middle_biome_or_badlands_if_hot(i: usize, j: usize, weirdness: Parameter) -> BiomeRef {
    if i == 4 {
        pick_badlands_biome(j, weirdness)
    } else {
        pick_middle_biome(i, j, weirdness)
    }
}

fn pick_middle_biome_or_badlands_if_hot_or_slope_if_cold(
    i: usize,
    j: usize,
    weirdness: Parameter,
) -> BiomeRef {
    if i == 0 {
        pick_slope_biome(i, j, weirdness)
    } else {
        pick_middle_biome_or_badlands_if_hot(i, j, weirdness)
    }
}

fn maybe_pick_windswept_savanna_biome(
    i: usize,
    j: usize,
    weirdness: Parameter,
    fallback: BiomeRef,
) -> BiomeRef {
    if i > 1 && j < 4 && !is_negative(weirdness) {
        &WINDSWEPT_SAVANNA
    } else {
        fallback
    }
}

fn pick_shattered_coast_biome(i: usize, j: usize, weirdness: Parameter) -> BiomeRef {
    let base = if is_negative(weirdness) {
        pick_beach_biome(i, j)
    } else {
        pick_middle_biome(i, j, weirdness)
    };
    maybe_pick_windswept_savanna_biome(i, j, weirdness, base)
}

fn pick_beach_biome(i: usize, _j: usize) -> BiomeRef {
    match i {
        0 => &SNOWY_BEACH,
        4 => &DESERT,
        _ => &BEACH,
    }
}

fn pick_badlands_biome(j: usize, weirdness: Parameter) -> BiomeRef {
    if j < 2 {
        if is_negative(weirdness) {
            &BADLANDS
        } else {
            &ERODED_BADLANDS
        }
    } else if j < 3 {
        &BADLANDS
    } else {
        &WOODED_BADLANDS
    }
}

fn pick_plateau_biome(i: usize, j: usize, weirdness: Parameter) -> BiomeRef {
    if !is_negative(weirdness)
        && let Some(variant) = PLATEAU_BIOMES_VARIANT[i][j]
    {
        return variant;
    }
    PLATEAU_BIOMES[i][j].unwrap_or(&PLAINS)
}

fn pick_peak_biome(i: usize, j: usize, weirdness: Parameter) -> BiomeRef {
    if i <= 2 {
        if is_negative(weirdness) {
            &JAGGED_PEAKS
        } else {
            &FROZEN_PEAKS
        }
    } else if i == 3 {
        &STONY_PEAKS
    } else {
        pick_badlands_biome(j, weirdness)
    }
}

fn pick_slope_biome(i: usize, j: usize, weirdness: Parameter) -> BiomeRef {
    if i >= 3 {
        pick_plateau_biome(i, j, weirdness)
    } else if j <= 1 {
        &SNOWY_SLOPES
    } else {
        &GROVE
    }
}

fn pick_shattered_biome(i: usize, j: usize, weirdness: Parameter) -> BiomeRef {
    SHATTERED_BIOMES[i][j].unwrap_or_else(|| pick_middle_biome(i, j, weirdness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::climate::TargetPoint;

    fn lookup(list: &ParameterList<BiomeRef>, t: f32, h: f32, c: f32, e: f32, d: f32, w: f32) -> BiomeRef {
        *list.find_value(&TargetPoint::new(t, h, c, e, d, w))
    }

    #[test]
    fn surface_entries_come_in_depth_pairs() {
        let list = OverworldBiomeBuilder::new().build();
        let surface = list
            .values()
            .iter()
            .filter(|(point, _)| point.depth == Parameter::point(0.0) || point.depth == Parameter::point(1.0))
            .count();
        assert_eq!(surface % 2, 0);
        assert_eq!(list.values().len() - surface, 3);
    }

    #[test]
    fn coarse_regions_resolve() {
        let list = OverworldBiomeBuilder::new().build();
        assert!(lookup(&list, 0.0, 0.0, -1.1, 0.0, 0.0, 0.0).is(&MUSHROOM_FIELDS));
        assert!(lookup(&list, -0.8, 0.0, -0.8, 0.0, 0.0, 0.0).is(&DEEP_FROZEN_OCEAN));
        assert!(lookup(&list, 0.8, 0.0, -0.3, 0.0, 0.0, 0.0).is(&WARM_OCEAN));
        assert!(lookup(&list, 0.0, 0.0, 0.0, -0.9, 1.1, 0.0).is(&DEEP_DARK));
        assert!(lookup(&list, 0.0, 0.0, 0.9, 0.0, 0.5, 0.0).is(&DRIPSTONE_CAVES));
        assert!(lookup(&list, 0.3, 0.0, 0.1, 0.3, 0.0, 0.0).is(&RIVER));
        assert!(lookup(&list, -0.8, 0.0, 0.1, 0.3, 0.0, 0.0).is(&FROZEN_RIVER));
        assert!(lookup(&list, 0.8, -0.8, 0.1, 0.3, 0.0, 0.3).is(&DESERT));
        assert!(lookup(&list, 0.0, -0.2, 0.1, 0.3, 0.0, -0.3).is(&PLAINS));
    }
}
