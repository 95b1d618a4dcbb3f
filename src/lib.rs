pub mod configuration;

pub mod equalizationerror;

pub mod analysis {
    pub mod figure;
    pub mod analyzer;
}

pub mod interpolation {
    pub mod interpolationbuilder;
    pub mod interpolatedmapping;
}

pub mod math {
    pub mod curve {
        pub mod curve;
        pub mod nonparametriccurve {
            pub mod nonparametriccurve;
            pub mod piecewisepolynomial;
        }
    }
    pub mod warp;
}

pub mod sample {
    pub mod sample;
    pub mod ranknormalizer;
}

pub mod selection {
    pub mod correlation;
    pub mod transformationselector;
}

pub mod solver {
    pub mod terminationcode;
    pub mod warpsolver;
    pub mod brentsolver;
}

pub mod transform {
    pub mod segment;
    pub mod segmenttransformer;
}
